use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ContractDto, ContractQuery, CreatedContractResponse};
use crate::application::services::{ContractInput, ContractService};
use crate::interfaces::http::common::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ContractHandlerState {
    pub contract_service: Arc<ContractService>,
}

#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contracts",
    security(("bearer_auth" = [])),
    params(ContractQuery),
    responses((status = 200, description = "Contracts with their parties, newest first", body = Vec<ContractDto>))
)]
pub async fn list_contracts(
    State(state): State<ContractHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ContractQuery>,
) -> ApiResult<Json<Vec<ContractDto>>> {
    let items = state.contract_service.list(user.user_id, query.into()).await?;
    Ok(Json(items.into_iter().map(ContractDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Contracts",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Contract id")),
    responses(
        (status = 200, description = "Contract with parties and generated text", body = ContractDto),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_contract(
    State(state): State<ContractHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContractDto>> {
    let contract = state.contract_service.get(user.user_id, &id).await?;
    Ok(Json(contract.into()))
}

/// Validates the lease terms, renders the contract text and stores it,
/// consuming one document from the monthly allowance.
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contracts",
    security(("bearer_auth" = [])),
    request_body = ContractInput,
    responses(
        (status = 201, description = "Contract generated", body = CreatedContractResponse),
        (status = 400, description = "Invalid terms or parties", body = ErrorBody),
        (status = 403, description = "PLAN_LIMIT_DOCUMENT", body = ErrorBody)
    )
)]
pub async fn create_contract(
    State(state): State<ContractHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<ContractInput>,
) -> ApiResult<(StatusCode, Json<CreatedContractResponse>)> {
    let created = state.contract_service.create(user.user_id, input).await?;
    let contract = ContractDto::from(created);
    let generated_text = contract.generated_text.clone().unwrap_or_default();
    Ok((
        StatusCode::CREATED,
        Json(CreatedContractResponse {
            contract,
            generated_text,
        }),
    ))
}
