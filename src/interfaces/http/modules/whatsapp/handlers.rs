use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;
use tracing::{error, info};

use super::dto::{
    ContactDto, ConversationDto, MessageDto, ReceivedResponse, SendMessageRequest, SendResult,
    VerifyQuery,
};
use crate::application::services::whatsapp::WhatsappHealth;
use crate::application::services::WhatsappService;
use crate::domain::whatsapp::WhatsappMessage;
use crate::domain::{DomainError, DomainResult};
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct WhatsappHandlerState {
    pub whatsapp_service: Arc<WhatsappService>,
}

/// Cloud API refusals become `502 {ok: false, error}`; every other
/// failure keeps the error envelope.
fn send_response(outcome: DomainResult<WhatsappMessage>) -> ApiResult<Response> {
    match outcome {
        Ok(message) => Ok(Json(SendResult::sent(&message)).into_response()),
        Err(DomainError::Integration { message, .. }) => {
            Ok((StatusCode::BAD_GATEWAY, Json(SendResult::failed(message))).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/whatsapp/send",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Delivered", body = SendResult),
        (status = 400, description = "Missing phone or text", body = ErrorBody),
        (status = 502, description = "Cloud API refused the message", body = SendResult)
    )
)]
pub async fn send_message(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Response> {
    let outcome = state
        .whatsapp_service
        .send_text(
            user.user_id,
            request.to.as_deref().unwrap_or_default(),
            request.text.as_deref().unwrap_or_default(),
        )
        .await;
    send_response(outcome)
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/health",
    tag = "WhatsApp",
    responses((status = 200, description = "Configuration status", body = WhatsappHealth))
)]
pub async fn whatsapp_health(State(state): State<WhatsappHandlerState>) -> Json<WhatsappHealth> {
    Json(state.whatsapp_service.health())
}

#[utoipa::path(
    post,
    path = "/api/whatsapp/test",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Test text delivered", body = SendResult),
        (status = 400, description = "WHATSAPP_TEST_TO_MISSING", body = ErrorBody),
        (status = 502, description = "Cloud API refused the message", body = SendResult)
    )
)]
pub async fn send_test(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Response> {
    send_response(state.whatsapp_service.send_test(user.user_id).await)
}

#[utoipa::path(
    post,
    path = "/api/whatsapp/test-template",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "hello_world template delivered", body = SendResult),
        (status = 502, description = "Cloud API refused the message", body = SendResult)
    )
)]
pub async fn send_test_template(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Response> {
    send_response(state.whatsapp_service.send_test_template(user.user_id).await)
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/webhook",
    tag = "WhatsApp",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Challenge echoed back", body = String),
        (status = 403, description = "Verify token mismatch")
    )
)]
pub async fn verify_webhook(
    State(state): State<WhatsappHandlerState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    match state.whatsapp_service.verify_webhook(
        query.mode.as_deref(),
        query.verify_token.as_deref(),
        query.challenge.as_deref(),
    ) {
        Some(challenge) => {
            info!("WhatsApp webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

/// Always acknowledges so Meta does not retry the delivery.
#[utoipa::path(
    post,
    path = "/api/whatsapp/webhook",
    tag = "WhatsApp",
    request_body = Object,
    responses((status = 200, description = "Delivery acknowledged", body = ReceivedResponse))
)]
pub async fn receive_webhook(
    State(state): State<WhatsappHandlerState>,
    Json(payload): Json<Value>,
) -> Json<ReceivedResponse> {
    if let Err(err) = state.whatsapp_service.handle_webhook(&payload).await {
        error!(error = %err, "Failed to store inbound WhatsApp message");
    }
    Json(ReceivedResponse { received: true })
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/contacts",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Contacts, most recently updated first", body = Vec<ContactDto>))
)]
pub async fn list_contacts(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<ContactDto>>> {
    let contacts = state.whatsapp_service.contacts(user.user_id).await?;
    Ok(Json(contacts.into_iter().map(ContactDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/conversations",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Conversations, latest activity first", body = Vec<ConversationDto>))
)]
pub async fn list_conversations(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<ConversationDto>>> {
    let conversations = state.whatsapp_service.conversations(user.user_id).await?;
    Ok(Json(conversations.into_iter().map(ConversationDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/whatsapp/conversations/{id}/messages",
    tag = "WhatsApp",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Messages in timestamp order", body = Vec<MessageDto>),
        (status = 404, description = "Not the caller's conversation", body = ErrorBody)
    )
)]
pub async fn list_messages(
    State(state): State<WhatsappHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<MessageDto>>> {
    let messages = state.whatsapp_service.messages(user.user_id, id).await?;
    Ok(Json(messages.into_iter().map(MessageDto::from).collect()))
}
