//! Legal mentor questions with file attachments
//!
//! Attachment quota is checked before any work and consumed only after the
//! model has answered, so a failed question costs nothing.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::assistant::{AssistantService, ChatMode};
use super::usage::UsageService;
use crate::domain::billing::MentorFileUsage;
use crate::domain::mentor::{
    build_mentor_prompt, stored_filename, summarize_attachment, AttachmentKind, NewMentorAttachment,
    DISALLOWED_TYPE_MESSAGE,
};
use crate::domain::ports::AiError;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::uploads::{extract_content, UploadStore, MENTOR_AREA};
use crate::shared::validations::non_blank;

/// One file received with a question.
#[derive(Debug, Clone)]
pub struct MentorUpload {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub id: i32,
    pub original_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MentorAnswer {
    pub answer: String,
    pub attachments: Vec<AttachmentRef>,
}

pub struct MentorService {
    repos: Arc<dyn RepositoryProvider>,
    assistant: Arc<AssistantService>,
    usage: UsageService,
    uploads: UploadStore,
}

impl MentorService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, assistant: Arc<AssistantService>, uploads: UploadStore) -> Self {
        Self {
            usage: UsageService::new(repos.clone()),
            repos,
            assistant,
            uploads,
        }
    }

    pub async fn usage(&self, user_id: i32) -> DomainResult<MentorFileUsage> {
        self.usage.get_mentor_file_usage(user_id).await
    }

    pub async fn ask(&self, user_id: i32, question: Option<&str>, files: Vec<MentorUpload>) -> DomainResult<MentorAnswer> {
        let question = non_blank(question)
            .ok_or_else(|| DomainError::invalid("INVALID_INPUT", "Informe uma pergunta em \"question\"."))?;

        let mut kinds = Vec::with_capacity(files.len());
        for file in &files {
            let kind = AttachmentKind::from_mime(&file.mime_type)
                .ok_or_else(|| DomainError::invalid("INVALID_FILE_TYPE", DISALLOWED_TYPE_MESSAGE))?;
            kinds.push(kind);
        }

        if !files.is_empty() {
            self.usage.check_mentor_file_question_limit(user_id, files.len()).await?;
            let plan = self
                .repos
                .users()
                .find_by_id(user_id)
                .await?
                .map(|u| u.plan.limits())
                .ok_or_else(|| DomainError::not_found("User", "id", user_id))?;
            if files.iter().any(|f| f.bytes.len() > plan.max_attachment_bytes()) {
                return Err(DomainError::invalid(
                    "FILE_TOO_LARGE",
                    format!("Cada arquivo deve ter no máximo {} MB.", plan.max_attachment_size_mb),
                ));
            }
        }

        let mut summaries = Vec::with_capacity(files.len());
        let mut attachments = Vec::with_capacity(files.len());
        for (file, kind) in files.iter().zip(kinds) {
            let filename = stored_filename(
                &file.original_name,
                user_id,
                Utc::now().timestamp_millis(),
                rand::random::<u32>() % 1_000_000_000,
            );
            let stored = self.uploads.save(MENTOR_AREA, &filename, &file.bytes).await?;
            let record = self
                .repos
                .mentor_attachments()
                .create(
                    user_id,
                    NewMentorAttachment {
                        filename,
                        original_name: file.original_name.clone(),
                        mime_type: file.mime_type.clone(),
                        size_bytes: stored.size_bytes,
                        storage_path: stored.path.display().to_string(),
                        checksum: Some(stored.checksum),
                    },
                )
                .await?;

            let content = extract_content(kind, &file.bytes).await;
            summaries.push(summarize_attachment(
                kind,
                &file.original_name,
                &file.mime_type,
                file.bytes.len(),
                &content,
            ));
            attachments.push(AttachmentRef {
                id: record.id,
                original_name: record.original_name,
                mime_type: record.mime_type,
            });
        }

        let prompt = build_mentor_prompt(question, &summaries);
        let answer = self.assistant.ask(ChatMode::Mentor, &prompt).await.map_err(|err| match err {
            AiError::MissingKey => DomainError::NotConfigured {
                code: "MISSING_GOOGLE_KEY",
                message: "Configure a GOOGLE_API_KEY antes de usar o Mentor.".into(),
            },
            other => {
                warn!(user_id, error = %other, "Mentor question failed");
                DomainError::Failed {
                    code: "MENTOR_ERROR",
                    message: "Erro ao processar pergunta do Mentor.".into(),
                    detail: other.to_string(),
                }
            }
        })?;

        self.usage
            .increment_mentor_file_question_usage(user_id, files.len())
            .await?;
        info!(user_id, attachments = attachments.len(), "Mentor question answered");

        Ok(MentorAnswer { answer, attachments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user, FakeAi};
    use crate::domain::billing::PlanType;

    fn txt(name: &str, body: &str) -> MentorUpload {
        MentorUpload {
            original_name: name.into(),
            mime_type: "text/plain".into(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    fn service(repos: Arc<dyn RepositoryProvider>, ai: Arc<FakeAi>, dir: &std::path::Path) -> MentorService {
        MentorService::new(repos, Arc::new(AssistantService::new(ai)), UploadStore::new(dir))
    }

    #[tokio::test]
    async fn answers_with_attachment_content_and_consumes_quota() {
        let (db, repos) = repos().await;
        let uid = user(&db, "mentor@imobi.test", PlanType::Starter).await;
        let dir = tempfile::tempdir().unwrap();
        let ai = Arc::new(FakeAi::replying("Resposta do mentor"));
        let mentor = service(repos, ai.clone(), dir.path());

        let answer = mentor
            .ask(uid, Some(" O contrato é válido? "), vec![txt("clausulas.txt", "Cláusula 5: multa")])
            .await
            .unwrap();

        assert_eq!(answer.answer, "Resposta do mentor");
        assert_eq!(answer.attachments.len(), 1);
        assert_eq!(answer.attachments[0].original_name, "clausulas.txt");
        assert!(ai.prompt_text(0).contains("Conteúdo do arquivo texto \"clausulas.txt\":\nCláusula 5: multa"));
        assert!(dir.path().join(MENTOR_AREA).read_dir().unwrap().next().is_some());
        assert_eq!(mentor.usage(uid).await.unwrap().used, 1);
    }

    #[tokio::test]
    async fn failed_answer_consumes_nothing() {
        let (db, repos) = repos().await;
        let uid = user(&db, "falha@imobi.test", PlanType::Starter).await;
        let dir = tempfile::tempdir().unwrap();
        let mentor = service(repos, Arc::new(FakeAi::new(vec![Err("boom".into())])), dir.path());

        let err = mentor.ask(uid, Some("Pergunta"), vec![txt("a.txt", "x")]).await.unwrap_err();
        assert!(matches!(err, DomainError::Failed { code: "MENTOR_ERROR", .. }));
        assert_eq!(mentor.usage(uid).await.unwrap().used, 0);
    }

    #[tokio::test]
    async fn rejects_blank_question_bad_type_and_exhausted_quota() {
        let (db, repos) = repos().await;
        let uid = user(&db, "limite@imobi.test", PlanType::Starter).await;
        let dir = tempfile::tempdir().unwrap();
        let replies = (0..5).map(|_| Ok("ok".to_string())).collect();
        let mentor = service(repos, Arc::new(FakeAi::new(replies)), dir.path());

        assert!(matches!(
            mentor.ask(uid, Some("   "), vec![]).await,
            Err(DomainError::Invalid { code: "INVALID_INPUT", .. })
        ));

        let zip = MentorUpload {
            original_name: "a.zip".into(),
            mime_type: "application/zip".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(
            mentor.ask(uid, Some("Q"), vec![zip]).await,
            Err(DomainError::Invalid { code: "INVALID_FILE_TYPE", .. })
        ));

        for _ in 0..5 {
            let files = vec![txt("1.txt", "a"), txt("2.txt", "b"), txt("3.txt", "c")];
            mentor.ask(uid, Some("Q"), files).await.unwrap();
        }
        assert!(matches!(
            mentor.ask(uid, Some("Q"), vec![txt("4.txt", "d")]).await,
            Err(DomainError::PlanLimit(_))
        ));
    }
}
