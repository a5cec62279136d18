//! Dashboard counters

pub mod handlers;

pub use handlers::*;
