use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::services::RenderedTemplate;
use crate::domain::notification::{
    NotificationStatus, NotificationTemplate, NotificationType, NotificationView, RecommendedChannel,
};
use crate::interfaces::http::modules::parties::PersonSummaryDto;
use crate::interfaces::http::modules::properties::PropertySummaryDto;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub label: &'static str,
    pub short_description: &'static str,
    pub default_title: &'static str,
    pub default_body: &'static str,
    pub recommended_channel: RecommendedChannel,
    pub tags: Vec<&'static str>,
}

impl From<&'static NotificationTemplate> for TemplateDto {
    fn from(t: &'static NotificationTemplate) -> Self {
        Self {
            notification_type: t.notification_type,
            label: t.label,
            short_description: t.short_description,
            default_title: t.default_title,
            default_body: t.default_body,
            recommended_channel: t.recommended_channel,
            tags: t.tags.to_vec(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenderRequest {
    /// Values for `{placeholder}` tokens; unknown tokens stay as they are
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderedTemplateDto {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
}

impl From<RenderedTemplate> for RenderedTemplateDto {
    fn from(r: RenderedTemplate) -> Self {
        Self {
            notification_type: r.notification_type,
            title: r.title,
            body: r.body,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub property_id: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: i32,
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub property_id: Option<i32>,
    pub landlord_id: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub property: Option<PropertySummaryDto>,
    pub landlord: Option<PersonSummaryDto>,
    pub tenant: Option<PersonSummaryDto>,
}

impl From<NotificationView> for NotificationDto {
    fn from(view: NotificationView) -> Self {
        let n = view.notification;
        Self {
            id: n.id,
            title: n.title,
            body: n.body,
            notification_type: n.notification_type,
            status: n.status,
            property_id: n.property_id,
            landlord_id: n.landlord_id,
            tenant_id: n.tenant_id,
            created_at: n.created_at,
            updated_at: n.updated_at,
            property: view.property.map(Into::into),
            landlord: view.landlord.map(Into::into),
            tenant: view.tenant.map(Into::into),
        }
    }
}
