//! Per-account counters for the dashboard and the overview card

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DomainResult, RepositoryProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_contracts: u64,
    pub active_contracts: u64,
    pub reviewing_contracts: u64,
    pub pending_notifications: u64,
    pub total_inspections: u64,
    pub pending_inspections: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_properties: u64,
    pub total_inspections: u64,
    pub total_contracts: u64,
    pub total_notifications: u64,
}

pub struct DashboardService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DashboardService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn summary(&self, user_id: i32) -> DomainResult<DashboardSummary> {
        let (contracts, inspections, pending_notifications) = tokio::try_join!(
            self.repos.contracts().stats(user_id),
            self.repos.inspections().stats(user_id),
            self.repos.notifications().count_pending(user_id),
        )?;
        Ok(DashboardSummary {
            total_contracts: contracts.total,
            active_contracts: contracts.active,
            reviewing_contracts: contracts.reviewing,
            pending_notifications,
            total_inspections: inspections.total,
            pending_inspections: inspections.pending,
        })
    }

    pub async fn overview(&self, user_id: i32) -> DomainResult<Overview> {
        let (total_properties, inspections, contracts, total_notifications) = tokio::try_join!(
            self.repos.properties().count(user_id),
            self.repos.inspections().stats(user_id),
            self.repos.contracts().stats(user_id),
            self.repos.notifications().count(user_id),
        )?;
        Ok(Overview {
            total_properties,
            total_inspections: inspections.total,
            total_contracts: contracts.total,
            total_notifications,
        })
    }
}
