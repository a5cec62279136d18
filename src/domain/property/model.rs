use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub landlord_name: Option<String>,
    pub landlord_contact: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PropertyDraft {
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub landlord_name: Option<String>,
    pub landlord_contact: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub landlord_name: Option<String>,
    pub landlord_contact: Option<String>,
    pub notes: Option<String>,
}

/// Short reference embedded in notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySummary {
    pub id: i32,
    pub title: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
}

impl From<&Property> for PropertySummary {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            address: p.address.clone(),
            city: p.city.clone(),
            state: p.state.clone(),
        }
    }
}
