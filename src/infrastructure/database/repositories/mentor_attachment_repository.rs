//! SeaORM implementation of MentorAttachmentRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::domain::mentor::{MentorAttachment, MentorAttachmentRepository, NewMentorAttachment};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::mentor_attachment;

pub struct SeaOrmMentorAttachmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmMentorAttachmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: mentor_attachment::Model) -> MentorAttachment {
    MentorAttachment {
        id: m.id,
        user_id: m.user_id,
        filename: m.filename,
        original_name: m.original_name,
        mime_type: m.mime_type,
        size_bytes: m.size_bytes,
        storage_path: m.storage_path,
        checksum: m.checksum,
        created_at: m.created_at,
    }
}

#[async_trait]
impl MentorAttachmentRepository for SeaOrmMentorAttachmentRepository {
    async fn create(&self, user_id: i32, new: NewMentorAttachment) -> DomainResult<MentorAttachment> {
        let model = mentor_attachment::ActiveModel {
            user_id: Set(user_id),
            filename: Set(new.filename),
            original_name: Set(new.original_name),
            mime_type: Set(new.mime_type),
            size_bytes: Set(new.size_bytes),
            storage_path: Set(new.storage_path),
            checksum: Set(new.checksum),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(model_to_domain(model))
    }
}
