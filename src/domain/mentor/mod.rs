//! Legal mentor attachments and prompt assembly

pub mod model;
pub mod repository;

pub use model::{
    build_mentor_prompt, stored_filename, summarize_attachment, AttachmentKind, ExtractedContent,
    MentorAttachment, NewMentorAttachment, ALLOWED_MIME_TYPES, DISALLOWED_TYPE_MESSAGE,
};
pub use repository::MentorAttachmentRepository;
