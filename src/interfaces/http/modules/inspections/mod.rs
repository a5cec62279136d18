//! Property inspections, AI photo analysis and the PDF report

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
