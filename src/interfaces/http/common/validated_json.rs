//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Failures
//! leave as the standard error envelope: `INVALID_JSON` for bodies that do
//! not parse, `VALIDATION_ERROR` with the offending field names otherwise.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiError;

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct RegisterRequest {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<RegisterRequest>) {}
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl From<ValidatedJsonRejection> for ApiError {
    fn from(rejection: ValidatedJsonRejection) -> Self {
        match rejection {
            ValidatedJsonRejection::JsonError(rejection) => {
                ApiError::bad_request("INVALID_JSON", format!("JSON inválido: {}", rejection.body_text()))
            }
            ValidatedJsonRejection::ValidationError(errors) => {
                let field_errors = errors.field_errors();
                let mut fields: Vec<String> = field_errors.keys().map(|f| f.to_string()).collect();
                fields.sort();

                let mut messages: Vec<String> = field_errors
                    .values()
                    .flat_map(|errs| errs.iter().filter_map(|e| e.message.as_ref().map(|m| m.to_string())))
                    .collect();
                messages.sort();

                let message = if messages.is_empty() {
                    "Dados inválidos.".to_string()
                } else {
                    messages.join(" ")
                };
                let mut err = ApiError::bad_request("VALIDATION_ERROR", message);
                err.body.error.fields = Some(fields);
                err
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value.validate().map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 2, message = "Nome muito curto."))]
        name: String,
        #[validate(email(message = "E-mail inválido."))]
        email: String,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    async fn send(body: Body) -> (StatusCode, serde_json::Value) {
        use tower::Service;
        let mut svc = Router::new().route("/test", post(handler)).into_service();
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let body = serde_json::json!({"name": "Ana", "email": "ana@imobi.test"});
        let (status, _) = send(Body::from(serde_json::to_vec(&body).unwrap())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_envelope() {
        let (status, body) = send(Body::from("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn validation_failure_lists_fields() {
        let body = serde_json::json!({"name": "A", "email": "nope"});
        let (status, body) = send(Body::from(serde_json::to_vec(&body).unwrap())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"], serde_json::json!(["email", "name"]));
        assert_eq!(body["error"]["message"], "E-mail inválido. Nome muito curto.");
    }
}
