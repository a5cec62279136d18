//! Liveness banner and database health check

pub mod handlers;

pub use handlers::*;
