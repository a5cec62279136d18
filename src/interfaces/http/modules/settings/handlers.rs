use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::{SettingsDto, UpdateSettingsRequest};
use crate::application::services::SettingsService;
use crate::interfaces::http::common::{ApiResult, ErrorBody};

#[derive(Clone)]
pub struct SettingsHandlerState {
    pub settings_service: Arc<SettingsService>,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Current settings, created with defaults on first read", body = SettingsDto))
)]
pub async fn get_settings(State(state): State<SettingsHandlerState>) -> ApiResult<Json<SettingsDto>> {
    Ok(Json(state.settings_service.get().await?.into()))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = SettingsDto),
        (status = 400, description = "INVALID_CONTRACT_TERM or INVALID_NOTIFY_DAYS", body = ErrorBody)
    )
)]
pub async fn update_settings(
    State(state): State<SettingsHandlerState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<SettingsDto>> {
    let updated = state.settings_service.update(request.into()).await?;
    Ok(Json(updated.into()))
}
