//! Paid subscription records, keyed by payer email

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Rejected,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Terminal payment states reported by the gateway that we mirror.
    pub fn from_payment_status(status: &str) -> Option<Self> {
        match status {
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: i32,
    pub email: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub price_cents: i64,
    pub currency: String,
    pub mp_pref_id: Option<String>,
    pub mp_payment_id: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPendingSubscription {
    pub email: String,
    pub plan_id: String,
    pub price_cents: i64,
    pub currency: String,
    pub mp_pref_id: Option<String>,
}

/// Approved payment to be reflected as an active subscription.
#[derive(Debug, Clone)]
pub struct PaymentActivation {
    pub payment_id: String,
    pub email: String,
    pub plan_id: String,
    pub price_cents: i64,
    pub currency: String,
    pub valid_until: DateTime<Utc>,
}
