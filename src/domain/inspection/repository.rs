use async_trait::async_trait;

use super::{Inspection, InspectionFilter, InspectionStats, NewInspection};
use crate::domain::DomainResult;

#[async_trait]
pub trait InspectionRepository: Send + Sync {
    /// Ordered by inspection date, latest first.
    async fn list(&self, user_id: i32, filter: InspectionFilter) -> DomainResult<Vec<Inspection>>;
    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<Inspection>>;

    /// Consumes one inspection from the monthly allowance and inserts the
    /// row in the same transaction.
    async fn create_metered(&self, user_id: i32, new: NewInspection) -> DomainResult<Inspection>;

    async fn update_status(&self, user_id: i32, id: i32, status: &str) -> DomainResult<Option<Inspection>>;

    /// Replaces the stored report document.
    async fn update_ai_json(&self, user_id: i32, id: i32, ai_json: String) -> DomainResult<Option<Inspection>>;

    async fn stats(&self, user_id: i32) -> DomainResult<InspectionStats>;
}
