//! Real-estate chat assistant

pub mod handlers;

pub use handlers::*;
