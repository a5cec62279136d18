//! Mercado Pago checkout, payment webhook and subscription lookup

pub mod handlers;

pub use handlers::*;
