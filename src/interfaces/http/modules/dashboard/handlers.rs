use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::application::services::dashboard::{DashboardSummary, Overview};
use crate::application::services::DashboardService;
use crate::interfaces::http::common::ApiResult;
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct DashboardHandlerState {
    pub dashboard_service: Arc<DashboardService>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Contract, notification and inspection counters", body = DashboardSummary))
)]
pub async fn dashboard_summary(
    State(state): State<DashboardHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.dashboard_service.summary(user.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/overview/me",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Record totals for the caller", body = Overview))
)]
pub async fn my_overview(
    State(state): State<DashboardHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Overview>> {
    Ok(Json(state.dashboard_service.overview(user.user_id).await?))
}
