//! Notices to tenants and landlords, plus the template catalog

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
