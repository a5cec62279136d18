//! Ports to third-party services
//!
//! Application services depend on these traits; the adapters live in
//! `infrastructure` and tests substitute in-memory fakes.

pub mod ai;
pub mod messaging;
pub mod payments;

pub use ai::{AiError, AiPart, AiProvider, AiReply, AiTask};
pub use messaging::{MessagingGateway, OutboundMessage};
pub use payments::{BackUrls, CheckoutPreference, CheckoutRequest, PaymentGateway, PaymentInfo};
