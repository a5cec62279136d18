//! Notification aggregate
//!
//! Formal notices sent to tenants and landlords, drafted from a fixed
//! template catalog.

pub mod model;
pub mod repository;
pub mod templates;

pub use model::{
    render_template, Notification, NotificationDraft, NotificationFilter, NotificationStatus,
    NotificationType, NotificationView,
};
pub use repository::NotificationRepository;
pub use templates::{find_template, NotificationTemplate, RecommendedChannel, NOTIFICATION_TEMPLATES};
