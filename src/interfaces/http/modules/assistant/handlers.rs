use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::application::services::assistant::{AiHealth, ChatReply};
use crate::application::services::AssistantService;
use crate::interfaces::http::common::{ApiResult, ErrorBody};

#[derive(Clone)]
pub struct AssistantHandlerState {
    pub assistant_service: Arc<AssistantService>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// `general`, `contract`, `inspection` or `notification`
    pub mode: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply from the model, or the fallback text", body = ChatReply),
        (status = 400, description = "Empty message", body = ErrorBody)
    )
)]
pub async fn chat(
    State(state): State<AssistantHandlerState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatReply>> {
    let reply = state
        .assistant_service
        .chat(request.message.as_deref(), request.mode.as_deref())
        .await?;
    Ok(Json(reply))
}

#[utoipa::path(
    get,
    path = "/health/gemini",
    tag = "Health",
    responses((status = 200, description = "AI provider reachability", body = AiHealth))
)]
pub async fn ai_health(State(state): State<AssistantHandlerState>) -> Json<AiHealth> {
    Json(state.assistant_service.health().await)
}
