//! Domain layer: aggregates, repository traits and third-party ports

pub mod billing;
pub mod contract;
pub mod inspection;
pub mod mentor;
pub mod notification;
pub mod party;
pub mod ports;
pub mod property;
pub mod repositories;
pub mod settings;
pub mod user;
pub mod whatsapp;

pub use repositories::{DomainResult, RepositoryProvider};

pub use crate::shared::errors::DomainError;
