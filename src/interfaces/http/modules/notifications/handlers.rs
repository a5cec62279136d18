use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{NotificationDto, NotificationQuery, RenderRequest, RenderedTemplateDto, TemplateDto};
use crate::application::services::{NotificationInput, NotificationService};
use crate::domain::notification::NOTIFICATION_TEMPLATES;
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct NotificationHandlerState {
    pub notification_service: Arc<NotificationService>,
}

#[utoipa::path(
    get,
    path = "/api/notifications/templates",
    tag = "Notifications",
    responses((status = 200, description = "Template catalog", body = Vec<TemplateDto>))
)]
pub async fn list_templates() -> Json<Vec<TemplateDto>> {
    Json(NOTIFICATION_TEMPLATES.iter().map(TemplateDto::from).collect())
}

#[utoipa::path(
    post,
    path = "/api/notifications/templates/{type}/render",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("type" = String, Path, description = "Notification type, e.g. COBRANCA_ALUGUEL_EM_ATRASO")),
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Template with placeholders filled", body = RenderedTemplateDto),
        (status = 400, description = "Unknown type", body = ErrorBody)
    )
)]
pub async fn render_template(
    State(state): State<NotificationHandlerState>,
    Path(notification_type): Path<String>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Json<RenderedTemplateDto>> {
    let rendered = state
        .notification_service
        .render(&notification_type, &request.variables)?;
    Ok(Json(rendered.into()))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery),
    responses((status = 200, description = "Notifications, newest first", body = Vec<NotificationDto>))
)]
pub async fn list_notifications(
    State(state): State<NotificationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<Vec<NotificationDto>>> {
    let items = state
        .notification_service
        .list(
            user.user_id,
            query.status.as_deref(),
            query.notification_type.as_deref(),
            query.property_id.as_deref(),
            query.q.as_deref(),
        )
        .await?;
    Ok(Json(items.into_iter().map(NotificationDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    request_body = NotificationInput,
    responses(
        (status = 201, description = "Created", body = NotificationDto),
        (status = 400, description = "title, body or type missing", body = ErrorBody),
        (status = 403, description = "PLAN_LIMIT_DOCUMENT", body = ErrorBody)
    )
)]
pub async fn create_notification(
    State(state): State<NotificationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<NotificationInput>,
) -> ApiResult<(StatusCode, Json<NotificationDto>)> {
    let created = state.notification_service.create(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification id")),
    request_body = NotificationInput,
    responses(
        (status = 200, description = "Updated", body = NotificationDto),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_notification(
    State(state): State<NotificationHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(input): Json<NotificationInput>,
) -> ApiResult<Json<NotificationDto>> {
    let updated = state.notification_service.update(user.user_id, id, input).await?;
    Ok(Json(updated.into()))
}
