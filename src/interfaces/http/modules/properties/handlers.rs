use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{PropertyDto, PropertyRequest};
use crate::application::services::PropertyService;
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct PropertyHandlerState {
    pub property_service: Arc<PropertyService>,
}

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Properties, newest first", body = Vec<PropertyDto>))
)]
pub async fn list_properties(
    State(state): State<PropertyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<PropertyDto>>> {
    let items = state.property_service.list(user.user_id).await?;
    Ok(Json(items.into_iter().map(PropertyDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    security(("bearer_auth" = [])),
    request_body = PropertyRequest,
    responses(
        (status = 201, description = "Created", body = PropertyDto),
        (status = 400, description = "title, address or city missing", body = ErrorBody)
    )
)]
pub async fn create_property(
    State(state): State<PropertyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PropertyRequest>,
) -> ApiResult<(StatusCode, Json<PropertyDto>)> {
    let property = state.property_service.create(user.user_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(property.into())))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Property id")),
    request_body = PropertyRequest,
    responses(
        (status = 200, description = "Updated", body = PropertyDto),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_property(
    State(state): State<PropertyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<PropertyRequest>,
) -> ApiResult<Json<PropertyDto>> {
    let property = state.property_service.update(user.user_id, id, request.into()).await?;
    Ok(Json(property.into()))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Property id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_property(
    State(state): State<PropertyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.property_service.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
