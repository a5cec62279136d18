use async_trait::async_trait;

use super::{AppSettings, SettingsPatch};
use crate::domain::DomainResult;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Creates the row with defaults on first access.
    async fn get(&self) -> DomainResult<AppSettings>;
    async fn update(&self, patch: SettingsPatch) -> DomainResult<AppSettings>;
}
