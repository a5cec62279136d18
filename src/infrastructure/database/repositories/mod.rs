//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod contract_repository;
pub mod inspection_repository;
pub mod mentor_attachment_repository;
pub mod notification_repository;
pub mod party_repository;
pub mod property_repository;
pub mod repository_provider;
pub mod settings_repository;
pub mod subscription_repository;
pub mod usage_repository;
pub mod user_repository;
pub mod whatsapp_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
pub use usage_repository::consume_quota;
