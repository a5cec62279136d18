//! Formal notices and the template catalog

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::contracts::NumberInput;
use crate::domain::notification::{
    find_template, render_template, NotificationDraft, NotificationFilter, NotificationStatus,
    NotificationType, NotificationView,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::non_blank;

/// Body of create and update requests; values are normalized by the service.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationInput {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub status: Option<String>,
    pub property_id: Option<NumberInput>,
    pub landlord_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// A template with its placeholders filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
}

fn parse_property_id(raw: &Option<NumberInput>) -> DomainResult<Option<i32>> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse()
            .filter(|n| n.fract() == 0.0)
            .map(|n| Some(n as i32))
            .ok_or_else(|| DomainError::invalid("INVALID_INPUT", "propertyId inválido.")),
    }
}

fn owned(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

pub struct NotificationService {
    repos: Arc<dyn RepositoryProvider>,
}

impl NotificationService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Fills `{placeholder}` tokens in the catalog entry for `type`.
    pub fn render(&self, raw_type: &str, variables: &HashMap<String, String>) -> DomainResult<RenderedTemplate> {
        let template = NotificationType::parse(raw_type)
            .and_then(find_template)
            .ok_or_else(|| DomainError::invalid("INVALID_TYPE", "Tipo de notificação inválido."))?;
        Ok(RenderedTemplate {
            notification_type: template.notification_type,
            title: render_template(template.default_title, variables),
            body: render_template(template.default_body, variables),
        })
    }

    /// Unknown status or type values are dropped rather than rejected.
    pub async fn list(
        &self,
        user_id: i32,
        status: Option<&str>,
        notification_type: Option<&str>,
        property_id: Option<&str>,
        q: Option<&str>,
    ) -> DomainResult<Vec<NotificationView>> {
        let filter = NotificationFilter {
            status: status.and_then(NotificationStatus::parse),
            notification_type: notification_type.and_then(NotificationType::parse),
            property_id: property_id.and_then(|p| p.trim().parse().ok()),
            q: non_blank(q).map(str::to_string),
        };
        self.repos.notifications().list(user_id, filter).await
    }

    pub async fn get(&self, user_id: i32, id: i32) -> DomainResult<NotificationView> {
        self.repos
            .notifications()
            .find(user_id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", "id", id))
    }

    pub async fn create(&self, user_id: i32, input: NotificationInput) -> DomainResult<NotificationView> {
        let notification_type = input.notification_type.as_deref().and_then(NotificationType::parse);
        let (Some(title), Some(body), Some(notification_type)) =
            (owned(&input.title), owned(&input.body), notification_type)
        else {
            return Err(DomainError::invalid(
                "VALIDATION_ERROR",
                "Campos obrigatórios: title, body, type.",
            ));
        };

        let draft = NotificationDraft {
            title,
            body,
            notification_type,
            status: input
                .status
                .as_deref()
                .and_then(NotificationStatus::parse)
                .unwrap_or_default(),
            property_id: parse_property_id(&input.property_id)?,
            landlord_id: owned(&input.landlord_id),
            tenant_id: owned(&input.tenant_id),
        };
        let created = self.repos.notifications().create_metered(user_id, draft).await?;
        info!(user_id, notification_id = created.notification.id, "Notification created");
        Ok(created)
    }

    pub async fn update(&self, user_id: i32, id: i32, input: NotificationInput) -> DomainResult<NotificationView> {
        let notification_type = input.notification_type.as_deref().and_then(NotificationType::parse);
        let status = input.status.as_deref().and_then(NotificationStatus::parse);
        let (Some(title), Some(body), Some(notification_type), Some(status)) =
            (owned(&input.title), owned(&input.body), notification_type, status)
        else {
            return Err(DomainError::invalid(
                "VALIDATION_ERROR",
                "Campos obrigatórios: title, body, type, status.",
            ));
        };

        let draft = NotificationDraft {
            title,
            body,
            notification_type,
            status,
            property_id: parse_property_id(&input.property_id)?,
            landlord_id: owned(&input.landlord_id),
            tenant_id: owned(&input.tenant_id),
        };
        self.repos
            .notifications()
            .update(user_id, id, draft)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user};
    use crate::domain::billing::{PlanType, QuotaKind};

    fn input(title: &str, kind: &str) -> NotificationInput {
        NotificationInput {
            title: Some(title.into()),
            body: Some("Prezado(a), informamos...".into()),
            notification_type: Some(kind.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_defaults_status_and_meters_documents() {
        let (db, repos) = repos().await;
        let uid = user(&db, "notif@imobi.test", PlanType::Starter).await;
        let service = NotificationService::new(repos);

        let created = service.create(uid, input("Atraso", "cobranca_aluguel_em_atraso")).await.unwrap();
        assert_eq!(created.notification.status, NotificationStatus::Pendente);
        assert_eq!(created.notification.notification_type, NotificationType::CobrancaAluguelEmAtraso);

        for i in 0..14 {
            service.create(uid, input(&format!("N{i}"), "ADVERTENCIA_FORMAL")).await.unwrap();
        }
        let err = service.create(uid, input("Extra", "ADVERTENCIA_FORMAL")).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.kind == QuotaKind::Document));
    }

    #[tokio::test]
    async fn invalid_type_or_property_is_rejected() {
        let (db, repos) = repos().await;
        let uid = user(&db, "notif2@imobi.test", PlanType::Starter).await;
        let service = NotificationService::new(repos);

        assert!(matches!(
            service.create(uid, input("X", "NAO_EXISTE")).await,
            Err(DomainError::Invalid { code: "VALIDATION_ERROR", .. })
        ));

        let mut bad_property = input("X", "ADVERTENCIA_FORMAL");
        bad_property.property_id = Some(NumberInput::Text("abc".into()));
        assert!(service.create(uid, bad_property).await.is_err());
        assert!(service.list(uid, None, None, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_requires_status_and_reports_missing_rows() {
        let (db, repos) = repos().await;
        let uid = user(&db, "notif3@imobi.test", PlanType::Starter).await;
        let service = NotificationService::new(repos);
        let created = service.create(uid, input("Reajuste", "REAJUSTE_ANUAL_ALUGUEL")).await.unwrap();
        let id = created.notification.id;

        assert!(service.update(uid, id, input("Reajuste", "REAJUSTE_ANUAL_ALUGUEL")).await.is_err());

        let mut sent = input("Reajuste 2026", "REAJUSTE_ANUAL_ALUGUEL");
        sent.status = Some("enviada".into());
        let updated = service.update(uid, id, sent.clone()).await.unwrap();
        assert_eq!(updated.notification.status, NotificationStatus::Enviada);
        assert_eq!(updated.notification.title, "Reajuste 2026");

        let listed = service.list(uid, Some("ENVIADA"), Some("bogus"), None, Some("2026")).await.unwrap();
        assert_eq!(listed.len(), 1);

        assert!(matches!(
            service.update(uid, id + 100, sent).await,
            Err(DomainError::NotFound { entity: "Notification", .. })
        ));
    }

    #[tokio::test]
    async fn render_fills_known_placeholders() {
        let (_db, repos) = repos().await;
        let service = NotificationService::new(repos);
        let vars = HashMap::from([
            ("nome_destinatario".to_string(), "Tito".to_string()),
            ("endereco_imovel".to_string(), "Rua F, 8".to_string()),
        ]);

        let rendered = service.render("aviso_fim_contrato", &vars).unwrap();
        assert!(rendered.body.starts_with("Prezado(a) Tito,"));
        assert!(rendered.body.contains("Rua F, 8"));
        assert!(rendered.body.contains("{data_fim}"));

        assert!(matches!(
            service.render("NADA", &vars),
            Err(DomainError::Invalid { code: "INVALID_TYPE", .. })
        ));
    }
}
