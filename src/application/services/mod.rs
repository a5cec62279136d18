//! Application services
//!
//! One service per resource. Each holds the repository provider and the
//! third-party ports it needs, and returns `DomainResult`.

pub mod assistant;
pub mod auth;
pub mod billing;
pub mod contracts;
pub mod dashboard;
pub mod inspections;
pub mod mentor;
pub mod notifications;
pub mod parties;
pub mod properties;
pub mod settings;
pub mod usage;
pub mod whatsapp;

#[cfg(test)]
pub mod testing;

pub use assistant::{AssistantService, ChatMode};
pub use auth::{AuthResult, AuthService, Registration};
pub use billing::BillingService;
pub use contracts::{ContractInput, ContractService, NumberInput};
pub use dashboard::DashboardService;
pub use inspections::{AnalyzeRequest, InspectionInput, InspectionService, UploadedImage};
pub use mentor::MentorService;
pub use notifications::{NotificationInput, NotificationService, RenderedTemplate};
pub use parties::PartyService;
pub use properties::PropertyService;
pub use settings::SettingsService;
pub use usage::{UsageOverview, UsageService};
pub use whatsapp::WhatsappService;
