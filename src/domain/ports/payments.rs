//! Payment gateway port (checkout preferences and payment lookups)

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::DomainResult;

#[derive(Debug, Clone)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub plan_id: String,
    pub title: String,
    pub unit_price: Decimal,
    pub price_cents: i64,
    pub currency: String,
    pub payer_email: String,
    pub back_urls: BackUrls,
    pub notification_url: String,
    pub statement_descriptor: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutPreference {
    pub id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

impl CheckoutPreference {
    pub fn checkout_url(&self) -> Option<&str> {
        self.init_point
            .as_deref()
            .or(self.sandbox_init_point.as_deref())
    }
}

/// The fields of a gateway payment the webhook relies on.
#[derive(Debug, Clone, Default)]
pub struct PaymentInfo {
    pub id: String,
    pub status: String,
    pub transaction_amount: Option<Decimal>,
    pub currency_id: Option<String>,
    pub payer_email: Option<String>,
    pub preference_id: Option<String>,
    pub metadata_plan_id: Option<String>,
    pub metadata_email: Option<String>,
}

impl PaymentInfo {
    /// Paid amount in cents, rounded half away from zero.
    pub fn amount_cents(&self) -> i64 {
        use rust_decimal::prelude::ToPrimitive;
        self.transaction_amount
            .map(|amount| (amount * Decimal::from(100)).round())
            .and_then(|cents| cents.to_i64())
            .unwrap_or(0)
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn create_preference(&self, request: CheckoutRequest) -> DomainResult<CheckoutPreference>;
    async fn get_payment(&self, payment_id: &str) -> DomainResult<PaymentInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn amount_cents_rounds() {
        let info = PaymentInfo {
            transaction_amount: Some(Decimal::from_str("49.9").unwrap()),
            ..Default::default()
        };
        assert_eq!(info.amount_cents(), 4990);
        assert_eq!(PaymentInfo::default().amount_cents(), 0);
    }
}
