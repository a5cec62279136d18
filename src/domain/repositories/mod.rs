//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::billing::{SubscriptionRepository, UsageRepository};
use super::contract::ContractRepository;
use super::inspection::InspectionRepository;
use super::mentor::MentorAttachmentRepository;
use super::notification::NotificationRepository;
use super::party::PartyRepository;
use super::property::PropertyRepository;
use super::settings::SettingsRepository;
use super::user::UserRepository;
use super::whatsapp::WhatsappRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let user = repos.users().find_by_id(1).await?;
///     let usage = repos.usage().consume(1, QuotaKind::Document, 1).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn usage(&self) -> &dyn UsageRepository;
    fn subscriptions(&self) -> &dyn SubscriptionRepository;
    fn parties(&self) -> &dyn PartyRepository;
    fn properties(&self) -> &dyn PropertyRepository;
    fn contracts(&self) -> &dyn ContractRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
    fn inspections(&self) -> &dyn InspectionRepository;
    fn mentor_attachments(&self) -> &dyn MentorAttachmentRepository;
    fn whatsapp(&self) -> &dyn WhatsappRepository;
    fn settings(&self) -> &dyn SettingsRepository;
}
