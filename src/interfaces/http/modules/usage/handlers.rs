use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::{UsageOverview, UsageService};
use crate::domain::billing::{PlanLimits, PlanType};
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct UsageHandlerState {
    pub usage_service: Arc<UsageService>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUsageDto {
    pub inspections_count: i32,
    pub documents_count: i32,
    pub mentor_file_questions_count: i32,
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    pub plan: PlanType,
    pub limits: PlanLimits,
    pub current: CurrentUsageDto,
}

impl From<UsageOverview> for UsageResponse {
    fn from(overview: UsageOverview) -> Self {
        let current = overview.current;
        Self {
            plan: overview.plan,
            limits: overview.limits,
            current: CurrentUsageDto {
                inspections_count: current.inspections_count,
                documents_count: current.documents_count,
                mentor_file_questions_count: current.mentor_file_questions_count,
                year: current.year,
                month: current.month,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/usage/me",
    tag = "Usage",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan, limits and this month's counters", body = UsageResponse),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn my_usage(
    State(state): State<UsageHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<UsageResponse>> {
    let overview = state.usage_service.overview(user.user_id).await?;
    Ok(Json(overview.into()))
}
