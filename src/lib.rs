//! # ImobiContract backend
//!
//! REST backend for real-estate agencies: tenant, landlord and property
//! registries, lease contracts, formal notices, AI-assisted inspections,
//! WhatsApp messaging and Mercado Pago subscriptions, all metered by
//! monthly plan quotas.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository traits and ports to third-party services
//! - **application**: one service per resource
//! - **infrastructure**: SeaORM persistence, HTTP clients, PDF rendering, crypto
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::create_api_router;
