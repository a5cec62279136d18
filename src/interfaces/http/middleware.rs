//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::common::ApiError;
use crate::domain::billing::PlanType;
use crate::infrastructure::crypto::{verify_token, JwtConfig, TokenClaims};

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller resolved from a bearer token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub plan: PlanType,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            email: claims.email,
            plan: claims.plan,
        })
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(String::from);
    let Some(token) = token else {
        return ApiError::unauthorized("Token de acesso ausente.").into_response();
    };

    let user = match verify_token(&token, &auth_state.jwt_config) {
        Ok(claims) => AuthenticatedUser::from_claims(claims),
        Err(err) => {
            debug!(error = %err, "Rejected bearer token");
            None
        }
    };
    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => ApiError::unauthorized("Token inválido ou expirado.").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use crate::infrastructure::crypto::create_token;

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        format!("{}:{}", user.user_id, user.plan)
    }

    fn app(config: &JwtConfig) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(
                AuthState { jwt_config: config.clone() },
                auth_middleware,
            ))
    }

    async fn call(config: &JwtConfig, auth: Option<String>) -> (StatusCode, String) {
        use tower::Service;
        let mut builder = Request::builder().uri("/me");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let mut svc = app(config).into_service();
        let resp = svc.call(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_bearer_reaches_handler() {
        let config = JwtConfig::new("mw-secret", 1);
        let token = create_token(7, "ana@imobi.test", PlanType::Pro, &config).unwrap();
        let (status, body) = call(&config, Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "7:PRO");
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_401() {
        let config = JwtConfig::new("mw-secret", 1);
        let (status, body) = call(&config, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));

        let (status, _) = call(&config, Some("Bearer nope".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let other = create_token(7, "a@b.c", PlanType::Starter, &JwtConfig::new("other", 1)).unwrap();
        let (status, _) = call(&config, Some(format!("Bearer {other}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
