//! Outbound messaging port (WhatsApp Cloud API)

use async_trait::async_trait;

use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Text { to: String, body: String },
    Template { to: String, name: String, language: String },
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Names of the settings that still need a value.
    fn missing_config(&self) -> Vec<&'static str>;

    fn is_configured(&self) -> bool;

    /// Returns the provider message id.
    async fn send(&self, message: OutboundMessage) -> DomainResult<String>;
}
