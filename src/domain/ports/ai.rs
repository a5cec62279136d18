//! Generative AI port
//!
//! Services describe *what* to ask (task, prompt parts); the adapter decides
//! which model serves the task and handles model fallback.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiTask {
    Mentor,
    Contract,
    Inspection,
    Summary,
    Notification,
}

impl AiTask {
    pub const ALL: [AiTask; 5] = [
        Self::Mentor,
        Self::Contract,
        Self::Inspection,
        Self::Summary,
        Self::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Contract => "contract",
            Self::Inspection => "inspection",
            Self::Summary => "summary",
            Self::Notification => "notification",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Mentor => "gemini-2.5-flash-live",
            Self::Contract | Self::Inspection | Self::Notification => "gemini-2.5-flash",
            Self::Summary => "gemini-2.5-flash-lite",
        }
    }
}

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum AiPart {
    Text(String),
    InlineData { mime_type: String, base64: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiReply {
    pub text: String,
    pub model: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("GOOGLE_API_KEY não configurada")]
    MissingKey,

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("EMPTY_GEMINI_RESPONSE")]
    EmptyResponse,

    #[error("Gemini request failed: {0}")]
    Transport(String),
}

impl AiError {
    /// Rate-limit or quota rejections; the next candidate model may still
    /// have allowance.
    pub fn is_quota(&self) -> bool {
        match self {
            Self::Api { status: 429, .. } => true,
            Self::Api { message, .. } | Self::Transport(message) => {
                let message = message.to_lowercase();
                message.contains("quota")
                    || message.contains("exceeded")
                    || message.contains("resource_exhausted")
            }
            _ => false,
        }
    }
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    fn has_key(&self) -> bool;

    /// Models tried for `task`, in order.
    fn candidates(&self, task: AiTask) -> Vec<String>;

    async fn generate(&self, task: AiTask, parts: Vec<AiPart>) -> Result<AiReply, AiError>;
}
