//! Mercado Pago REST client
//!
//! Checkout preferences (`POST /checkout/preferences`) and payment lookups
//! (`GET /v1/payments/{id}`), authenticated with the seller access token.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::MercadoPagoConfig;
use crate::domain::ports::{CheckoutPreference, CheckoutRequest, PaymentGateway, PaymentInfo};
use crate::domain::{DomainError, DomainResult};

const ERROR_CODE: &str = "MERCADO_PAGO_ERROR";

pub struct MercadoPagoClient {
    http: reqwest::Client,
    config: MercadoPagoConfig,
}

impl MercadoPagoClient {
    pub fn new(config: MercadoPagoConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    fn token(&self) -> DomainResult<&str> {
        self.config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::NotConfigured {
                code: "MP_NOT_CONFIGURED",
                message: "Mercado Pago não configurado no servidor.".into(),
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn read(response: reqwest::Response) -> DomainResult<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "Mercado Pago request failed");
            return Err(integration(message));
        }
        Ok(body)
    }
}

fn integration(message: impl Into<String>) -> DomainError {
    DomainError::Integration {
        code: ERROR_CODE,
        message: message.into(),
    }
}

/// Preference payload: one item, the payer, and the metadata the webhook
/// reads back.
pub fn preference_body(request: &CheckoutRequest) -> Value {
    let unit_price = request.unit_price.to_f64().unwrap_or_default();
    json!({
        "items": [{
            "id": request.plan_id,
            "title": request.title,
            "quantity": 1,
            "unit_price": unit_price,
            "currency_id": request.currency,
        }],
        "payer": { "email": request.payer_email },
        "metadata": {
            "planId": request.plan_id,
            "email": request.payer_email,
            "priceCents": request.price_cents,
            "currency": request.currency,
        },
        "back_urls": {
            "success": request.back_urls.success,
            "failure": request.back_urls.failure,
            "pending": request.back_urls.pending,
        },
        "auto_return": "approved",
        "notification_url": request.notification_url,
        "statement_descriptor": request.statement_descriptor,
        "payment_methods": { "default_payment_method_id": "pix" },
    })
}

/// Reads the fields of a payment resource the webhook relies on. Metadata
/// keys come back snake_cased from the gateway, so both spellings are read.
pub fn parse_payment(body: &Value) -> PaymentInfo {
    let string = |v: Option<&Value>| -> Option<String> {
        match v? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    let metadata = body.get("metadata");
    let meta = |keys: &[&str]| keys.iter().find_map(|k| string(metadata.and_then(|m| m.get(*k))));

    PaymentInfo {
        id: string(body.get("id")).unwrap_or_default(),
        status: string(body.get("status")).unwrap_or_default(),
        transaction_amount: body
            .get("transaction_amount")
            .and_then(Value::as_f64)
            .and_then(Decimal::from_f64),
        currency_id: string(body.get("currency_id")),
        payer_email: string(body.pointer("/payer/email")),
        preference_id: string(body.get("preference_id"))
            .or_else(|| string(body.pointer("/order/id")))
            .or_else(|| meta(&["preference_id"]))
            .or_else(|| string(body.pointer("/additional_info/items/0/id")))
            .or_else(|| meta(&["prefId", "pref_id"])),
        metadata_plan_id: meta(&["planId", "plan_id"]),
        metadata_email: meta(&["email"]),
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    fn is_configured(&self) -> bool {
        self.token().is_ok()
    }

    async fn create_preference(&self, request: CheckoutRequest) -> DomainResult<CheckoutPreference> {
        let token = self.token()?;
        let response = self
            .http
            .post(self.url("/checkout/preferences"))
            .bearer_auth(token)
            .json(&preference_body(&request))
            .send()
            .await
            .map_err(|e| integration(e.to_string()))?;
        let body = Self::read(response).await?;

        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| integration("Resposta sem id de preferência"))?;
        Ok(CheckoutPreference {
            id: id.to_string(),
            init_point: body.get("init_point").and_then(Value::as_str).map(str::to_string),
            sandbox_init_point: body
                .get("sandbox_init_point")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> DomainResult<PaymentInfo> {
        let token = self.token()?;
        let response = self
            .http
            .get(self.url(&format!("/v1/payments/{payment_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| integration(e.to_string()))?;
        let body = Self::read(response).await?;
        Ok(parse_payment(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::BackUrls;
    use std::str::FromStr;

    #[test]
    fn preference_payload_shape() {
        let body = preference_body(&CheckoutRequest {
            plan_id: "pro_monthly".into(),
            title: "Imobi Contract Pro Mensal".into(),
            unit_price: Decimal::from_str("97.00").unwrap(),
            price_cents: 9700,
            currency: "BRL".into(),
            payer_email: "ana@example.com".into(),
            back_urls: BackUrls {
                success: "s".into(),
                failure: "f".into(),
                pending: "p".into(),
            },
            notification_url: "http://localhost:4000/api/billing/webhook/mercadopago".into(),
            statement_descriptor: "IMOBI CONTRACT".into(),
        });
        assert_eq!(body["items"][0]["unit_price"], 97.0);
        assert_eq!(body["items"][0]["quantity"], 1);
        assert_eq!(body["metadata"]["priceCents"], 9700);
        assert_eq!(body["payment_methods"]["default_payment_method_id"], "pix");
        assert_eq!(body["auto_return"], "approved");
    }

    #[test]
    fn payment_reads_snake_case_metadata() {
        let info = parse_payment(&json!({
            "id": 123456,
            "status": "approved",
            "transaction_amount": 49.9,
            "currency_id": "BRL",
            "payer": { "email": "payer@example.com" },
            "metadata": { "plan_id": "basic_monthly", "email": "ana@example.com" }
        }));
        assert_eq!(info.id, "123456");
        assert_eq!(info.amount_cents(), 4990);
        assert_eq!(info.metadata_plan_id.as_deref(), Some("basic_monthly"));
        assert_eq!(info.metadata_email.as_deref(), Some("ana@example.com"));
        assert_eq!(info.payer_email.as_deref(), Some("payer@example.com"));
    }

    #[test]
    fn preference_id_falls_back_through_payment_sources() {
        let cases = [
            json!({ "id": 1, "preference_id": "pref-top", "order": { "id": "order-1" } }),
            json!({ "id": 1, "order": { "id": "pref-order" } }),
            json!({ "id": 1, "metadata": { "preference_id": "pref-meta" } }),
            json!({ "id": 1, "additional_info": { "items": [{ "id": "pref-item" }] } }),
            json!({ "id": 1, "metadata": { "pref_id": "pref-short" } }),
            json!({ "id": 1, "metadata": { "prefId": "pref-camel" } }),
        ];
        let found: Vec<Option<String>> = cases.iter().map(|c| parse_payment(c).preference_id).collect();
        assert_eq!(
            found,
            ["pref-top", "pref-order", "pref-meta", "pref-item", "pref-short", "pref-camel"]
                .map(|s| Some(s.to_string()))
        );

        assert_eq!(parse_payment(&json!({ "id": 1 })).preference_id, None);
    }

    #[test]
    fn order_id_is_read_when_numeric() {
        let info = parse_payment(&json!({ "id": 1, "order": { "id": 998877 } }));
        assert_eq!(info.preference_id.as_deref(), Some("998877"));
    }

    #[test]
    fn unconfigured_without_token() {
        let client = MercadoPagoClient::new(MercadoPagoConfig::default());
        assert!(!client.is_configured());
    }
}
