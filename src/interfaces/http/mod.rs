//! HTTP REST API
//!
//! - `common`: error envelope, validated JSON and multipart helpers
//! - `middleware`: bearer-token authentication
//! - `modules`: one handler module per resource
//! - `router`: route table, OpenAPI document and layers

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiContext};
