use async_trait::async_trait;

use super::{MentorAttachment, NewMentorAttachment};
use crate::domain::DomainResult;

#[async_trait]
pub trait MentorAttachmentRepository: Send + Sync {
    async fn create(&self, user_id: i32, new: NewMentorAttachment) -> DomainResult<MentorAttachment>;
}
