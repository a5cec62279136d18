use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::application::services::billing::{
    payment_id_from, CheckoutSession, SubscriptionStatusView, WebhookOutcome,
};
use crate::application::services::BillingService;
use crate::interfaces::http::common::{ApiResult, ErrorBody};

#[derive(Clone)]
pub struct BillingHandlerState {
    pub billing_service: Arc<BillingService>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutBody {
    pub plan_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SubscriptionStatusQuery {
    pub email: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/billing/create-checkout",
    tag = "Billing",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "Checkout preference created", body = CheckoutSession),
        (status = 400, description = "INVALID_PLAN or INVALID_EMAIL", body = ErrorBody),
        (status = 500, description = "MP_NOT_CONFIGURED", body = ErrorBody)
    )
)]
pub async fn create_checkout(
    State(state): State<BillingHandlerState>,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<Json<CheckoutSession>> {
    let session = state
        .billing_service
        .create_checkout(body.plan_id.as_deref(), body.email.as_deref())
        .await?;
    Ok(Json(session))
}

/// Mercado Pago posts either a JSON body or only query parameters, so the
/// body is parsed leniently.
#[utoipa::path(
    post,
    path = "/api/billing/webhook/mercadopago",
    tag = "Billing",
    request_body = Object,
    responses(
        (status = 200, description = "Notification handled", body = WebhookOutcome),
        (status = 500, description = "WEBHOOK_ERROR", body = ErrorBody)
    )
)]
pub async fn mercadopago_webhook(
    State(state): State<BillingHandlerState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> ApiResult<Json<WebhookOutcome>> {
    let payload: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|err| {
            debug!(error = %err, "Webhook body is not JSON");
            Value::Null
        })
    };
    let payment_id = payment_id_from(&query, &payload);
    let outcome = state.billing_service.handle_webhook(payment_id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/billing/subscription-status",
    tag = "Billing",
    params(SubscriptionStatusQuery),
    responses(
        (status = 200, description = "Latest active subscription for the email", body = SubscriptionStatusView),
        (status = 400, description = "INVALID_EMAIL", body = ErrorBody)
    )
)]
pub async fn subscription_status(
    State(state): State<BillingHandlerState>,
    Query(query): Query<SubscriptionStatusQuery>,
) -> ApiResult<Json<SubscriptionStatusView>> {
    let view = state
        .billing_service
        .subscription_status(query.email.as_deref())
        .await?;
    Ok(Json(view))
}
