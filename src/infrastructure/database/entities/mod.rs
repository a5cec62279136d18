//! Database entities module

pub mod app_settings;
pub mod contract;
pub mod contract_party;
pub mod inspection;
pub mod mentor_attachment;
pub mod notification;
pub mod party;
pub mod property;
pub mod subscription;
pub mod usage_monthly;
pub mod user;
pub mod whatsapp_contact;
pub mod whatsapp_conversation;
pub mod whatsapp_message;

pub use app_settings::Entity as AppSettings;
pub use contract::Entity as Contract;
pub use contract_party::Entity as ContractParty;
pub use inspection::Entity as Inspection;
pub use mentor_attachment::Entity as MentorAttachment;
pub use notification::Entity as Notification;
pub use party::Entity as Party;
pub use property::Entity as Property;
pub use subscription::Entity as Subscription;
pub use usage_monthly::Entity as UsageMonthly;
pub use user::Entity as User;
pub use whatsapp_contact::Entity as WhatsappContact;
pub use whatsapp_conversation::Entity as WhatsappConversation;
pub use whatsapp_message::Entity as WhatsappMessage;
