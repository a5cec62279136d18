//! Tenant and landlord registries, served under `/api/tenants` and
//! `/api/landlords` with the same handlers

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
