use thiserror::Error;

use crate::domain::billing::PlanLimitError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// Required fields absent from the request; `message` is user-facing.
    #[error("Missing fields: {}", fields.join(", "))]
    MissingFields {
        message: String,
        fields: Vec<String>,
    },

    /// Rule violation carrying its own public error code.
    #[error("{code}: {message}")]
    Invalid { code: &'static str, message: String },

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    PlanLimit(#[from] PlanLimitError),

    /// A third-party API (AI, payments, messaging) failed.
    #[error("{code}: {message}")]
    Integration { code: &'static str, message: String },

    /// A third-party API is required but credentials are missing.
    #[error("{code}: {message}")]
    NotConfigured { code: &'static str, message: String },

    /// An operation failed in a way the client can only retry. `detail`
    /// is the underlying cause, echoed for debugging.
    #[error("{code}: {detail}")]
    Failed {
        code: &'static str,
        message: String,
        detail: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Database(e) => DomainError::Database(e.to_string()),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::QuotaKind;

    #[test]
    fn plan_limit_converts_and_keeps_kind() {
        let err: DomainError = PlanLimitError::new(QuotaKind::Document, 15, 15).into();
        match err {
            DomainError::PlanLimit(e) => assert_eq!(e.kind, QuotaKind::Document),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn io_errors_become_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: DomainError = InfraError::from(io).into();
        assert!(matches!(err, DomainError::Internal(msg) if msg.contains("disk full")));
    }
}
