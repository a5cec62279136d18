//! Subscription checkout through Mercado Pago
//!
//! A checkout leaves a PENDING row keyed by preference id. The payment
//! webhook later confirms the amount against the catalog and activates the
//! subscription, moving the payer's account to the plan tier.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::config::PublicUrls;
use crate::domain::billing::{
    resolve_plan, NewPendingSubscription, PaymentActivation, SubscriptionStatus,
};
use crate::domain::ports::{BackUrls, CheckoutRequest, PaymentGateway, PaymentInfo};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::{is_valid_email, non_blank};

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_API_URL: &str = "http://localhost:4000";
const STATEMENT_DESCRIPTOR: &str = "IMOBI CONTRACT";
const SUBSCRIPTION_DAYS: i64 = 30;

const UNKNOWN_EMAIL: &str = "cliente@desconhecido";
const UNKNOWN_PLAN: &str = "desconhecido";

/// Parses `raw` as an absolute URL and drops the trailing slash, falling
/// back to `fallback` when it is not one.
pub fn normalize_base_url(raw: &str, fallback: &str) -> String {
    let candidate = raw.trim();
    let source = if candidate.is_empty() { fallback } else { candidate };
    match Url::parse(source) {
        Ok(url) if url.has_host() => url.as_str().trim_end_matches('/').to_string(),
        _ => fallback.trim_end_matches('/').to_string(),
    }
}

/// Payment id from the query (`data.id` or `id`) or the body
/// (`data.id`, `data.payment.id` or `id`).
pub fn payment_id_from(query: &HashMap<String, String>, body: &Value) -> Option<String> {
    fn as_id(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    query
        .get("data.id")
        .or_else(|| query.get("id"))
        .and_then(|id| non_blank(Some(id.as_str())))
        .map(str::to_string)
        .or_else(|| body.pointer("/data/id").and_then(as_id))
        .or_else(|| body.pointer("/data/payment/id").and_then(as_id))
        .or_else(|| body.get("id").and_then(as_id))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: Option<String>,
    pub preference_id: String,
    pub subscription_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum WebhookOutcome {
    /// Notification without a payment to look up.
    Received { received: bool },
    Ignored { ok: bool, ignored: &'static str },
    Processed { ok: bool, status: String },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusView {
    pub has_active_subscription: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub struct BillingService {
    repos: Arc<dyn RepositoryProvider>,
    gateway: Arc<dyn PaymentGateway>,
    frontend_url: String,
    api_url: String,
}

impl BillingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, gateway: Arc<dyn PaymentGateway>, urls: &PublicUrls) -> Self {
        Self {
            repos,
            gateway,
            frontend_url: normalize_base_url(&urls.frontend_base_url, DEFAULT_FRONTEND_URL),
            api_url: normalize_base_url(&urls.api_base_url, DEFAULT_API_URL),
        }
    }

    fn not_configured(message: &str) -> DomainError {
        DomainError::NotConfigured {
            code: "MP_NOT_CONFIGURED",
            message: message.to_string(),
        }
    }

    pub async fn create_checkout(&self, plan_id: Option<&str>, email: Option<&str>) -> DomainResult<CheckoutSession> {
        let plan = non_blank(plan_id)
            .and_then(resolve_plan)
            .ok_or_else(|| DomainError::invalid("INVALID_PLAN", "Plano inválido."))?;
        let email = non_blank(email)
            .filter(|e| is_valid_email(e))
            .ok_or_else(|| DomainError::invalid("INVALID_EMAIL", "Informe um e-mail válido para a assinatura."))?;
        if !self.gateway.is_configured() {
            return Err(Self::not_configured("Mercado Pago não configurado no servidor."));
        }

        let return_url = |status: &str| format!("{}/app/assinatura/retorno?status={status}", self.frontend_url);
        let request = CheckoutRequest {
            plan_id: plan.id.to_string(),
            title: plan.title.to_string(),
            unit_price: Decimal::new(plan.price_cents, 2),
            price_cents: plan.price_cents,
            currency: plan.currency.to_string(),
            payer_email: email.to_string(),
            back_urls: BackUrls {
                success: return_url("success"),
                failure: return_url("failure"),
                pending: return_url("pending"),
            },
            notification_url: format!("{}/api/billing/webhook/mercadopago", self.api_url),
            statement_descriptor: STATEMENT_DESCRIPTOR.to_string(),
        };

        let preference = self.gateway.create_preference(request).await.map_err(|err| match err {
            DomainError::NotConfigured { .. } => err,
            other => {
                error!(plan = plan.id, error = %other, "Checkout preference failed");
                DomainError::Failed {
                    code: "CHECKOUT_ERROR",
                    message: "Não foi possível iniciar o checkout no momento.".into(),
                    detail: other.to_string(),
                }
            }
        })?;

        let subscription = self
            .repos
            .subscriptions()
            .create_pending(NewPendingSubscription {
                email: email.to_string(),
                plan_id: plan.id.to_string(),
                price_cents: plan.price_cents,
                currency: plan.currency.to_string(),
                mp_pref_id: Some(preference.id.clone()),
            })
            .await?;
        info!(plan = plan.id, subscription_id = subscription.id, "Checkout started");

        Ok(CheckoutSession {
            checkout_url: preference.checkout_url().map(str::to_string),
            preference_id: preference.id,
            subscription_id: subscription.id,
        })
    }

    pub async fn handle_webhook(&self, payment_id: Option<String>) -> DomainResult<WebhookOutcome> {
        let Some(payment_id) = payment_id else {
            return Ok(WebhookOutcome::Received { received: true });
        };
        if !self.gateway.is_configured() {
            return Err(Self::not_configured("MP não configurado."));
        }

        self.process_payment(&payment_id).await.map_err(|err| match err {
            DomainError::NotConfigured { .. } => err,
            other => {
                error!(%payment_id, error = %other, "Mercado Pago webhook failed");
                DomainError::Failed {
                    code: "WEBHOOK_ERROR",
                    message: "Erro ao processar webhook do Mercado Pago.".into(),
                    detail: other.to_string(),
                }
            }
        })
    }

    async fn process_payment(&self, payment_id: &str) -> DomainResult<WebhookOutcome> {
        let payment = self.gateway.get_payment(payment_id).await?;
        let plan = payment.metadata_plan_id.as_deref().and_then(resolve_plan);

        let owner = match &payment.preference_id {
            Some(pref) => self.repos.subscriptions().find_by_pref_id(pref).await?,
            None => None,
        };
        let expected_cents = plan.map(|p| p.price_cents).or(owner.as_ref().map(|s| s.price_cents));
        let expected_currency = plan
            .map(|p| p.currency.to_string())
            .or(owner.as_ref().map(|s| s.currency.clone()));

        if payment.status == "approved" {
            if let (Some(expected), Some(actual)) = (&expected_currency, &payment.currency_id) {
                if expected != actual {
                    warn!(payment_id, %expected, %actual, "Payment currency mismatch");
                    return Ok(WebhookOutcome::Ignored { ok: true, ignored: "CURRENCY_MISMATCH" });
                }
            }
            if let Some(expected) = expected_cents {
                if expected != payment.amount_cents() {
                    warn!(payment_id, expected, paid = payment.amount_cents(), "Payment amount mismatch");
                    return Ok(WebhookOutcome::Ignored { ok: true, ignored: "AMOUNT_MISMATCH" });
                }
            }
            self.activate(&payment, expected_cents, expected_currency).await?;
        } else if let Some(status) = SubscriptionStatus::from_payment_status(&payment.status) {
            let touched = self
                .repos
                .subscriptions()
                .set_status(&payment.id, payment.preference_id.as_deref(), status)
                .await?;
            info!(payment_id, %status, touched, "Subscription status mirrored");
        }

        Ok(WebhookOutcome::Processed {
            ok: true,
            status: payment.status,
        })
    }

    async fn activate(
        &self,
        payment: &PaymentInfo,
        expected_cents: Option<i64>,
        expected_currency: Option<String>,
    ) -> DomainResult<()> {
        let email = payment
            .metadata_email
            .clone()
            .or_else(|| payment.payer_email.clone())
            .unwrap_or_else(|| UNKNOWN_EMAIL.to_string());
        let plan_id = payment
            .metadata_plan_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_PLAN.to_string());

        let subscription = self
            .repos
            .subscriptions()
            .activate_by_payment(PaymentActivation {
                payment_id: payment.id.clone(),
                email: email.clone(),
                plan_id: plan_id.clone(),
                price_cents: expected_cents.unwrap_or_else(|| payment.amount_cents()),
                currency: expected_currency
                    .or_else(|| payment.currency_id.clone())
                    .unwrap_or_else(|| "BRL".to_string()),
                valid_until: Utc::now() + Duration::days(SUBSCRIPTION_DAYS),
            })
            .await?;

        if let Some(plan) = resolve_plan(&plan_id) {
            let moved = self.repos.users().set_plan_by_email(&email, plan.tier).await?;
            info!(subscription_id = subscription.id, plan = plan.id, account_found = moved, "Subscription activated");
        } else {
            warn!(subscription_id = subscription.id, %plan_id, "Activated subscription for an unknown plan");
        }
        Ok(())
    }

    pub async fn subscription_status(&self, email: Option<&str>) -> DomainResult<SubscriptionStatusView> {
        let email = non_blank(email)
            .ok_or_else(|| DomainError::invalid("INVALID_EMAIL", "Informe o e-mail para consultar a assinatura."))?;

        Ok(match self.repos.subscriptions().find_active_by_email(email).await? {
            Some(sub) => SubscriptionStatusView {
                has_active_subscription: true,
                plan_id: Some(sub.plan_id),
                valid_until: sub.valid_until,
                status: Some(sub.status.as_str().to_string()),
            },
            None => SubscriptionStatusView {
                has_active_subscription: false,
                plan_id: None,
                valid_until: None,
                status: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user, FakePayments};
    use crate::domain::billing::PlanType;
    use serde_json::json;
    use std::str::FromStr;

    fn urls() -> PublicUrls {
        PublicUrls {
            api_base_url: "https://api.imobi.test/".into(),
            frontend_base_url: "not a url".into(),
        }
    }

    fn approved(id: &str, amount: &str, pref: &str) -> PaymentInfo {
        PaymentInfo {
            id: id.into(),
            status: "approved".into(),
            transaction_amount: Some(Decimal::from_str(amount).unwrap()),
            currency_id: Some("BRL".into()),
            payer_email: Some("pagador@imobi.test".into()),
            preference_id: Some(pref.into()),
            metadata_plan_id: Some("pro_monthly".into()),
            metadata_email: Some("assinante@imobi.test".into()),
        }
    }

    #[test]
    fn base_urls_are_normalized() {
        assert_eq!(normalize_base_url("https://app.imobi.test/", DEFAULT_FRONTEND_URL), "https://app.imobi.test");
        assert_eq!(normalize_base_url("  ", DEFAULT_API_URL), "http://localhost:4000");
        assert_eq!(normalize_base_url("localhost", DEFAULT_API_URL), "http://localhost:4000");
    }

    #[test]
    fn payment_id_prefers_query_then_body() {
        let query = HashMap::from([("data.id".to_string(), "77".to_string())]);
        assert_eq!(payment_id_from(&query, &json!({"id": 1})).as_deref(), Some("77"));
        assert_eq!(
            payment_id_from(&HashMap::new(), &json!({"data": {"payment": {"id": 123}}})).as_deref(),
            Some("123")
        );
        assert_eq!(payment_id_from(&HashMap::new(), &json!({"type": "test"})), None);
    }

    #[tokio::test]
    async fn checkout_builds_preference_and_pending_row() {
        let (_db, repos) = repos().await;
        let gateway = Arc::new(FakePayments::new());
        let service = BillingService::new(repos.clone(), gateway.clone(), &urls());

        let session = service
            .create_checkout(Some("basic_monthly"), Some("novo@imobi.test"))
            .await
            .unwrap();
        assert_eq!(session.preference_id, "pref-1");
        assert_eq!(session.checkout_url.as_deref(), Some("https://mp.test/checkout/pref-1"));

        let request = gateway.requests.lock().unwrap()[0].clone();
        assert_eq!(request.unit_price, Decimal::from_str("49.90").unwrap());
        assert_eq!(request.back_urls.success, "http://localhost:5173/app/assinatura/retorno?status=success");
        assert_eq!(request.notification_url, "https://api.imobi.test/api/billing/webhook/mercadopago");

        let pending = repos.subscriptions().find_by_pref_id("pref-1").await.unwrap().unwrap();
        assert_eq!(pending.status, SubscriptionStatus::Pending);
        assert_eq!(pending.id, session.subscription_id);
    }

    #[tokio::test]
    async fn checkout_rejects_bad_input_and_missing_gateway() {
        let (_db, repos) = repos().await;
        let service = BillingService::new(repos.clone(), Arc::new(FakePayments::new()), &urls());
        assert!(matches!(
            service.create_checkout(Some("gold"), Some("a@b.co")).await,
            Err(DomainError::Invalid { code: "INVALID_PLAN", .. })
        ));
        assert!(matches!(
            service.create_checkout(Some("pro_monthly"), Some("sem-arroba")).await,
            Err(DomainError::Invalid { code: "INVALID_EMAIL", .. })
        ));

        let mut off = FakePayments::new();
        off.configured = false;
        let service = BillingService::new(repos, Arc::new(off), &urls());
        assert!(matches!(
            service.create_checkout(Some("pro_monthly"), Some("a@b.co")).await,
            Err(DomainError::NotConfigured { code: "MP_NOT_CONFIGURED", .. })
        ));
    }

    #[tokio::test]
    async fn approved_payment_activates_once_and_upgrades_account() {
        let (db, repos) = repos().await;
        let uid = user(&db, "assinante@imobi.test", PlanType::Starter).await;
        let payment = approved("pay-1", "97.00", "pref-x");
        let service = BillingService::new(repos.clone(), Arc::new(FakePayments::with_payment(payment)), &urls());

        let first = service.handle_webhook(Some("pay-1".into())).await.unwrap();
        assert_eq!(first, WebhookOutcome::Processed { ok: true, status: "approved".into() });
        service.handle_webhook(Some("pay-1".into())).await.unwrap();

        let status = service.subscription_status(Some("assinante@imobi.test")).await.unwrap();
        assert!(status.has_active_subscription);
        assert_eq!(status.plan_id.as_deref(), Some("pro_monthly"));
        assert!(status.valid_until.unwrap() > Utc::now() + Duration::days(29));

        let account = repos.users().find_by_id(uid).await.unwrap().unwrap();
        assert_eq!(account.plan, PlanType::Pro);
    }

    #[tokio::test]
    async fn mismatched_payments_are_ignored() {
        let (_db, repos) = repos().await;
        let cheap = approved("pay-2", "9.70", "pref-y");
        let service = BillingService::new(repos.clone(), Arc::new(FakePayments::with_payment(cheap)), &urls());
        assert_eq!(
            service.handle_webhook(Some("pay-2".into())).await.unwrap(),
            WebhookOutcome::Ignored { ok: true, ignored: "AMOUNT_MISMATCH" }
        );

        let mut usd = approved("pay-3", "97.00", "pref-z");
        usd.currency_id = Some("USD".into());
        let service = BillingService::new(repos.clone(), Arc::new(FakePayments::with_payment(usd)), &urls());
        assert_eq!(
            service.handle_webhook(Some("pay-3".into())).await.unwrap(),
            WebhookOutcome::Ignored { ok: true, ignored: "CURRENCY_MISMATCH" }
        );

        let status = service.subscription_status(Some("assinante@imobi.test")).await.unwrap();
        assert!(!status.has_active_subscription);
    }

    #[tokio::test]
    async fn rejected_payment_marks_the_pending_row() {
        let (_db, repos) = repos().await;
        let gateway = Arc::new(FakePayments::new());
        let service = BillingService::new(repos.clone(), gateway.clone(), &urls());
        service.create_checkout(Some("pro_monthly"), Some("r@imobi.test")).await.unwrap();

        *gateway.payment.lock().unwrap() = Some(PaymentInfo {
            id: "pay-9".into(),
            status: "rejected".into(),
            preference_id: Some("pref-1".into()),
            ..Default::default()
        });
        let outcome = service.handle_webhook(Some("pay-9".into())).await.unwrap();
        assert_eq!(outcome, WebhookOutcome::Processed { ok: true, status: "rejected".into() });
        let row = repos.subscriptions().find_by_pref_id("pref-1").await.unwrap().unwrap();
        assert_eq!(row.status, SubscriptionStatus::Rejected);
    }

    #[tokio::test]
    async fn webhook_without_payment_or_with_lookup_error() {
        let (_db, repos) = repos().await;
        let service = BillingService::new(repos, Arc::new(FakePayments::new()), &urls());
        assert_eq!(
            service.handle_webhook(None).await.unwrap(),
            WebhookOutcome::Received { received: true }
        );
        assert!(matches!(
            service.handle_webhook(Some("desconhecido".into())).await,
            Err(DomainError::Failed { code: "WEBHOOK_ERROR", .. })
        ));
        assert!(matches!(
            service.subscription_status(Some(" ")).await,
            Err(DomainError::Invalid { code: "INVALID_EMAIL", .. })
        ));
    }
}
