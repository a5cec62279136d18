//! Mentor questions with file attachments

pub mod handlers;

pub use handlers::*;
