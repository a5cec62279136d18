use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::property::{Property, PropertyDraft, PropertyPatch, PropertySummary};

/// Body for create (title, address, city required) and partial update.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyRequest {
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub landlord_name: Option<String>,
    pub landlord_contact: Option<String>,
    pub notes: Option<String>,
}

impl From<PropertyRequest> for PropertyDraft {
    fn from(r: PropertyRequest) -> Self {
        Self {
            title: r.title.unwrap_or_default(),
            address: r.address.unwrap_or_default(),
            city: r.city.unwrap_or_default(),
            state: r.state,
            zip_code: r.zip_code,
            property_type: r.property_type,
            status: r.status,
            landlord_name: r.landlord_name,
            landlord_contact: r.landlord_contact,
            notes: r.notes,
        }
    }
}

impl From<PropertyRequest> for PropertyPatch {
    fn from(r: PropertyRequest) -> Self {
        Self {
            title: r.title,
            address: r.address,
            city: r.city,
            state: r.state,
            zip_code: r.zip_code,
            property_type: r.property_type,
            status: r.status,
            landlord_name: r.landlord_name,
            landlord_contact: r.landlord_contact,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    pub id: i32,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub landlord_name: Option<String>,
    pub landlord_contact: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Property> for PropertyDto {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            title: p.title,
            address: p.address,
            city: p.city,
            state: p.state,
            zip_code: p.zip_code,
            property_type: p.property_type,
            status: p.status,
            landlord_name: p.landlord_name,
            landlord_contact: p.landlord_contact,
            notes: p.notes,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertySummaryDto {
    pub id: i32,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
}

impl From<PropertySummary> for PropertySummaryDto {
    fn from(p: PropertySummary) -> Self {
        Self {
            id: p.id,
            title: p.title,
            address: p.address,
            city: p.city,
            state: p.state,
        }
    }
}
