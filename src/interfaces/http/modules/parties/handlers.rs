//! Tenant / landlord handlers. The router mounts them twice, each copy
//! with its own `PartyRole` in state.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::dto::{DeleteResponse, PartyDto, PartyQuery, PersonRequest};
use crate::application::services::PartyService;
use crate::domain::party::{PartyDeletion, PartyRole};
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct PartyHandlerState {
    pub party_service: Arc<PartyService>,
    pub role: PartyRole,
}

#[utoipa::path(
    get,
    path = "/api/{registry}",
    tag = "Tenants & Landlords",
    security(("bearer_auth" = [])),
    params(
        ("registry" = String, Path, description = "`tenants` or `landlords`"),
        PartyQuery
    ),
    responses((status = 200, description = "Active records, newest first", body = Vec<PartyDto>))
)]
pub async fn list_parties(
    State(state): State<PartyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PartyQuery>,
) -> ApiResult<Json<Vec<PartyDto>>> {
    let items = state
        .party_service
        .list(user.user_id, state.role, query.q.as_deref())
        .await?;
    Ok(Json(items.into_iter().map(PartyDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/{registry}/{id}",
    tag = "Tenants & Landlords",
    security(("bearer_auth" = [])),
    params(
        ("registry" = String, Path, description = "`tenants` or `landlords`"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Record", body = PartyDto),
        (status = 404, description = "Not found or deleted", body = ErrorBody)
    )
)]
pub async fn get_party(
    State(state): State<PartyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<PartyDto>> {
    let party = state.party_service.get(user.user_id, state.role, &id).await?;
    Ok(Json(party.into()))
}

#[utoipa::path(
    post,
    path = "/api/{registry}",
    tag = "Tenants & Landlords",
    security(("bearer_auth" = [])),
    params(("registry" = String, Path, description = "`tenants` or `landlords`")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Created", body = PartyDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "CPF already registered", body = ErrorBody)
    )
)]
pub async fn create_party(
    State(state): State<PartyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<PersonRequest>,
) -> ApiResult<Json<PartyDto>> {
    let party = state
        .party_service
        .create(user.user_id, state.role, request.into())
        .await?;
    Ok(Json(party.into()))
}

#[utoipa::path(
    put,
    path = "/api/{registry}/{id}",
    tag = "Tenants & Landlords",
    security(("bearer_auth" = [])),
    params(
        ("registry" = String, Path, description = "`tenants` or `landlords`"),
        ("id" = String, Path, description = "Record id")
    ),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Replaced", body = PartyDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_party(
    State(state): State<PartyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<PersonRequest>,
) -> ApiResult<Json<PartyDto>> {
    let party = state
        .party_service
        .update(user.user_id, state.role, &id, request.into())
        .await?;
    Ok(Json(party.into()))
}

#[utoipa::path(
    delete,
    path = "/api/{registry}/{id}",
    tag = "Tenants & Landlords",
    security(("bearer_auth" = [])),
    params(
        ("registry" = String, Path, description = "`tenants` or `landlords`"),
        ("id" = String, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Soft-deleted when linked to a contract, removed otherwise", body = DeleteResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_party(
    State(state): State<PartyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deletion = state.party_service.delete(user.user_id, state.role, &id).await?;
    Ok(Json(DeleteResponse {
        ok: true,
        soft_deleted: deletion == PartyDeletion::Soft,
    }))
}
