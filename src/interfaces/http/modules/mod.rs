pub mod assistant;
pub mod auth;
pub mod billing;
pub mod contracts;
pub mod dashboard;
pub mod health;
pub mod inspections;
pub mod mentor;
pub mod metrics;
pub mod notifications;
pub mod parties;
pub mod properties;
pub mod settings;
pub mod usage;
pub mod whatsapp;
