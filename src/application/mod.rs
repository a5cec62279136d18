//! Application layer: use cases over the domain repositories and ports

pub mod services;

pub use services::{
    AssistantService, AuthService, BillingService, ContractService, DashboardService,
    InspectionService, MentorService, NotificationService, PartyService, PropertyService,
    SettingsService, UsageService, WhatsappService,
};
