//! Shared HTTP types: the error envelope and small response bodies
//!
//! Every failure leaves the API as
//! `{"error": {"code", "message", "fields"?, "debugReason"?}}`.

pub mod multipart;
pub mod validated_json;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::billing::QuotaKind;
use crate::domain::DomainError;

pub use multipart::{FilePart, MultipartForm};
pub use validated_json::ValidatedJson;

const INTERNAL_MESSAGE: &str = "Erro interno no servidor.";

/// Error details inside the envelope.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// `{"ok": true}` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Failure leaving a handler: a status plus the envelope body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: ErrorDetail {
                    code: code.into(),
                    message: message.into(),
                    fields: None,
                    debug_reason: None,
                },
            },
        }
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", INTERNAL_MESSAGE)
    }

    fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.body.error.fields = Some(fields);
        self
    }

    fn with_debug_reason(mut self, reason: String) -> Self {
        self.body.error.debug_reason = Some(reason);
        self
    }

    pub fn code(&self) -> &str {
        &self.body.error.code
    }
}

fn not_found_message(entity: &str) -> &'static str {
    match entity {
        "User" => "Usuário não encontrado.",
        "Property" => "Imóvel não encontrado.",
        "Notification" => "Notificação não encontrada.",
        "Inspection" => "Vistoria não encontrada.",
        "Conversation" => "Conversa não encontrada.",
        "Contract" => "Contrato não encontrado.",
        "Tenant" => "Inquilino não encontrado.",
        "Landlord" => "Locador não encontrado.",
        _ => "Registro não encontrado.",
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, .. } => {
                let code = if entity == "User" { "USER_NOT_FOUND" } else { "NOT_FOUND" };
                Self::new(StatusCode::NOT_FOUND, code, not_found_message(entity))
            }
            DomainError::MissingFields { message, fields } => {
                Self::bad_request("VALIDATION_ERROR", message).with_fields(fields)
            }
            DomainError::Invalid { code, message } => Self::bad_request(code, message),
            DomainError::Validation(message) => Self::bad_request("VALIDATION_ERROR", message),
            DomainError::Conflict(message) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            DomainError::Unauthorized(message) => Self::unauthorized(message),
            DomainError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message),
            DomainError::PlanLimit(limit) => {
                let (code, message) = match limit.kind {
                    QuotaKind::Document => (
                        "PLAN_LIMIT_DOCUMENT",
                        "Limite mensal de documentos do seu plano foi atingido.",
                    ),
                    QuotaKind::Inspection => (
                        "PLAN_LIMIT_INSPECTION",
                        "Limite mensal de vistorias do seu plano foi atingido.",
                    ),
                    QuotaKind::MentorFileQuestion => ("PLAN_LIMIT_MENTOR_FILE", limit.message()),
                };
                Self::new(StatusCode::FORBIDDEN, code, message)
            }
            DomainError::Integration { code, message } => Self::new(StatusCode::BAD_GATEWAY, code, message),
            DomainError::NotConfigured { code, message } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
            }
            DomainError::Failed { code, message, detail } => {
                error!(code, %detail, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message).with_debug_reason(detail)
            }
            DomainError::Database(detail) | DomainError::Internal(detail) => {
                error!(%detail, "Unhandled server error");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanLimitError;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn plan_limits_map_to_forbidden_with_kind_code() {
        let err: ApiError = DomainError::from(PlanLimitError::new(QuotaKind::Document, 15, 15)).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "PLAN_LIMIT_DOCUMENT");
        assert_eq!(
            body["error"]["message"],
            "Limite mensal de documentos do seu plano foi atingido."
        );
    }

    #[tokio::test]
    async fn missing_fields_are_listed() {
        let err: ApiError = DomainError::MissingFields {
            message: "Campos obrigatórios: nome.".into(),
            fields: vec!["fullName".into()],
        }
        .into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"][0], "fullName");
        assert!(body["error"].get("debugReason").is_none());
    }

    #[tokio::test]
    async fn not_found_uses_entity_message() {
        let (status, body) = body_of(DomainError::not_found("User", "id", 3).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "USER_NOT_FOUND");

        let (_, body) = body_of(DomainError::not_found("Property", "id", 3).into()).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Imóvel não encontrado.");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = body_of(DomainError::Database("locked".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Erro interno no servidor.");

        let failed = DomainError::Failed {
            code: "AI_ANALYZE_ERROR",
            message: "Falha ao analisar.".into(),
            detail: "bad json".into(),
        };
        let (_, body) = body_of(failed.into()).await;
        assert_eq!(body["error"]["code"], "AI_ANALYZE_ERROR");
        assert_eq!(body["error"]["debugReason"], "bad json");
    }
}
