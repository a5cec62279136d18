use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};

use crate::application::services::mentor::{MentorAnswer, MentorUpload};
use crate::application::services::MentorService;
use crate::domain::billing::MentorFileUsage;
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorBody, MultipartForm};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Upload ceiling per request, independent of the plan.
pub const MAX_UPLOAD_FILES: usize = 3;

#[derive(Clone)]
pub struct MentorHandlerState {
    pub mentor_service: Arc<MentorService>,
}

#[utoipa::path(
    get,
    path = "/api/mentor/usage",
    tag = "Mentor",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "File-question allowance this month", body = MentorFileUsage))
)]
pub async fn mentor_usage(
    State(state): State<MentorHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<MentorFileUsage>> {
    Ok(Json(state.mentor_service.usage(user.user_id).await?))
}

/// Multipart form with a `question` text field and up to three
/// `attachments` (PDF, images or plain text).
#[utoipa::path(
    post,
    path = "/api/mentor/ask",
    tag = "Mentor",
    security(("bearer_auth" = [])),
    request_body(content_type = "multipart/form-data", description = "Question and attachments"),
    responses(
        (status = 200, description = "Answer", body = MentorAnswer),
        (status = 400, description = "Invalid question or files", body = ErrorBody),
        (status = 403, description = "PLAN_LIMIT_MENTOR_FILE", body = ErrorBody)
    )
)]
pub async fn ask_mentor(
    State(state): State<MentorHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> ApiResult<Json<MentorAnswer>> {
    let form = MultipartForm::read(multipart, "attachments").await?;
    if form.files.len() > MAX_UPLOAD_FILES {
        return Err(ApiError::bad_request(
            "TOO_MANY_ATTACHMENTS",
            format!("Máximo de {MAX_UPLOAD_FILES} anexos por pergunta. Remova arquivos e tente novamente."),
        ));
    }

    let question = form.text("question");
    let uploads = form
        .files
        .into_iter()
        .map(|f| MentorUpload {
            original_name: f.file_name.unwrap_or_else(|| "arquivo".to_string()),
            mime_type: f.content_type,
            bytes: f.bytes,
        })
        .collect();

    let answer = state
        .mentor_service
        .ask(user.user_id, question.as_deref(), uploads)
        .await?;
    Ok(Json(answer))
}
