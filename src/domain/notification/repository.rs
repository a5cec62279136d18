use async_trait::async_trait;

use super::{NotificationDraft, NotificationFilter, NotificationView};
use crate::domain::DomainResult;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: i32, filter: NotificationFilter) -> DomainResult<Vec<NotificationView>>;
    async fn find(&self, user_id: i32, id: i32) -> DomainResult<Option<NotificationView>>;

    /// Consumes one document from the monthly allowance and inserts the
    /// notification in the same transaction.
    async fn create_metered(&self, user_id: i32, draft: NotificationDraft) -> DomainResult<NotificationView>;

    async fn update(&self, user_id: i32, id: i32, draft: NotificationDraft) -> DomainResult<Option<NotificationView>>;

    async fn count(&self, user_id: i32) -> DomainResult<u64>;
    async fn count_pending(&self, user_id: i32) -> DomainResult<u64>;
}
