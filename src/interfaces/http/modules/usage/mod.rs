//! Plan usage for the current month

pub mod handlers;

pub use handlers::*;
