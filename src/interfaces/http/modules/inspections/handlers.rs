use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::error;

use super::dto::{InspectionDto, InspectionQuery, StatusRequest, TextRequest};
use crate::application::services::{AnalyzeRequest, InspectionInput, InspectionService, UploadedImage};
use crate::domain::inspection::{AnalysisMetadata, InspectionAnalysis};
use crate::infrastructure::reporting::{render_inspection_report, report_filename};
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorBody, MultipartForm};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct InspectionHandlerState {
    pub inspection_service: Arc<InspectionService>,
}

#[utoipa::path(
    get,
    path = "/api/inspections",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(InspectionQuery),
    responses((status = 200, description = "Inspections, most recent date first", body = Vec<InspectionDto>))
)]
pub async fn list_inspections(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<InspectionQuery>,
) -> ApiResult<Json<Vec<InspectionDto>>> {
    let items = state
        .inspection_service
        .list(
            user.user_id,
            query.status.as_deref(),
            query.tipo.as_deref(),
            query.q.as_deref(),
        )
        .await?;
    Ok(Json(items.into_iter().map(InspectionDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/inspections/{id}",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inspection id")),
    responses(
        (status = 200, description = "Inspection", body = InspectionDto),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_inspection(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<Json<InspectionDto>> {
    let inspection = state.inspection_service.get(user.user_id, id).await?;
    Ok(Json(inspection.into()))
}

#[utoipa::path(
    post,
    path = "/api/inspections",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    request_body = InspectionInput,
    responses(
        (status = 201, description = "Created", body = InspectionDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 403, description = "PLAN_LIMIT_INSPECTION", body = ErrorBody)
    )
)]
pub async fn create_inspection(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(input): Json<InspectionInput>,
) -> ApiResult<(StatusCode, Json<InspectionDto>)> {
    let created = state.inspection_service.create(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/inspections/{id}/status",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inspection id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Updated", body = InspectionDto),
        (status = 400, description = "INVALID_STATUS", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_inspection_status(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<InspectionDto>> {
    let updated = state
        .inspection_service
        .update_status(user.user_id, id, request.status.as_deref())
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/api/inspections/{id}/addendums",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inspection id")),
    request_body = TextRequest,
    responses(
        (status = 200, description = "Addendum appended to the report", body = InspectionDto),
        (status = 400, description = "INVALID_TEXT", body = ErrorBody)
    )
)]
pub async fn add_addendum(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<InspectionDto>> {
    let updated = state
        .inspection_service
        .add_addendum(user.user_id, id, request.text.as_deref())
        .await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    post,
    path = "/api/inspections/{id}/manual-notes",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inspection id")),
    request_body = TextRequest,
    responses(
        (status = 200, description = "Note appended to the report", body = InspectionDto),
        (status = 400, description = "INVALID_TEXT", body = ErrorBody)
    )
)]
pub async fn add_manual_note(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
    Json(request): Json<TextRequest>,
) -> ApiResult<Json<InspectionDto>> {
    let updated = state
        .inspection_service
        .add_manual_note(user.user_id, id, request.text.as_deref())
        .await?;
    Ok(Json(updated.into()))
}

/// Multipart form: `files` (images), `endereco`, `tipo`, `observacoes`,
/// repeated `ambientes` / `notas` aligned with the files, repeated
/// `locadores` / `locatarios`, plus `cidadeUf`, `tipoVistoria` and
/// `objetoVistoria`.
#[utoipa::path(
    post,
    path = "/api/inspections/analyze",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "Photos and inspection metadata"),
    responses(
        (status = 200, description = "Normalized AI report", body = InspectionAnalysis),
        (status = 400, description = "Missing fields or files", body = ErrorBody),
        (status = 500, description = "MISSING_GOOGLE_KEY or AI_ANALYZE_ERROR", body = ErrorBody)
    )
)]
pub async fn analyze_inspection(
    State(state): State<InspectionHandlerState>,
    multipart: Multipart,
) -> ApiResult<Json<InspectionAnalysis>> {
    let form = MultipartForm::read(multipart, "files").await?;
    let request = AnalyzeRequest {
        endereco: form.text("endereco"),
        tipo: form.text("tipo"),
        observacoes: form.text("observacoes"),
        ambientes: form.list("ambientes"),
        notas: form.list("notas"),
        metadata: AnalysisMetadata {
            locadores: form.list_opt("locadores"),
            locatarios: form.list_opt("locatarios"),
            cidade_uf: form.text("cidadeUf"),
            tipo_vistoria: form.text("tipoVistoria"),
            objeto_vistoria: form.text("objetoVistoria"),
        },
        files: form
            .files
            .into_iter()
            .map(|f| UploadedImage {
                original_name: f.file_name,
                mime_type: f.content_type,
                bytes: f.bytes,
            })
            .collect(),
    };
    let analysis = state.inspection_service.analyze(request).await?;
    Ok(Json(analysis))
}

#[utoipa::path(
    get,
    path = "/api/inspections/{id}/report-pdf",
    tag = "Inspections",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Inspection id")),
    responses(
        (status = 200, description = "A4 report", content_type = "application/pdf"),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn report_pdf(
    State(state): State<InspectionHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    let inspection = state.inspection_service.get(user.user_id, id).await?;
    let filename = report_filename(&inspection.endereco);
    let pdf = tokio::task::spawn_blocking(move || render_inspection_report(&inspection))
        .await
        .map_err(|err| {
            error!(error = %err, "Report task panicked");
            ApiError::internal()
        })?
        .map_err(|err| {
            error!(inspection_id = id, error = %err, "Report rendering failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF_ERROR",
                "Erro ao gerar PDF da vistoria.",
            )
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
