//! Property aggregate

pub mod model;
pub mod repository;

pub use model::{Property, PropertyDraft, PropertyPatch, PropertySummary};
pub use repository::PropertyRepository;
