//! Account-wide settings

use std::sync::Arc;

use tracing::info;

use crate::domain::settings::{AppSettings, SettingsPatch};
use crate::domain::{DomainResult, RepositoryProvider};

pub struct SettingsService {
    repos: Arc<dyn RepositoryProvider>,
}

impl SettingsService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn get(&self) -> DomainResult<AppSettings> {
        self.repos.settings().get().await
    }

    pub async fn update(&self, patch: SettingsPatch) -> DomainResult<AppSettings> {
        patch.validate()?;
        let updated = self.repos.settings().update(patch).await?;
        info!("Settings updated");
        Ok(updated)
    }
}
