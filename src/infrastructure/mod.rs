//! Infrastructure layer - external concerns

pub mod ai;
pub mod crypto;
pub mod database;
pub mod messaging;
pub mod payments;
pub mod reporting;
pub mod uploads;

pub use ai::GeminiClient;
pub use database::repositories::SeaOrmRepositoryProvider;
pub use database::{init_database, DatabaseConfig};
pub use messaging::WhatsappCloudClient;
pub use payments::MercadoPagoClient;
pub use uploads::UploadStore;
