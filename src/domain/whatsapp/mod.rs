//! WhatsApp contacts, conversations and message log

pub mod model;
pub mod repository;

pub use model::{
    normalize_phone, ConversationWithContact, InboundMessage, MessageDirection, MessageStatus,
    NewWhatsappMessage, WhatsappContact, WhatsappConversation, WhatsappMessage,
};
pub use repository::WhatsappRepository;
