//! Property registry

use std::sync::Arc;

use crate::domain::property::{Property, PropertyDraft, PropertyPatch};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::non_blank;

const REQUIRED_MESSAGE: &str = "title, address e city são obrigatórios.";

pub struct PropertyService {
    repos: Arc<dyn RepositoryProvider>,
}

fn not_found(id: i32) -> DomainError {
    DomainError::not_found("Property", "id", id)
}

fn trimmed(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

impl PropertyService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, user_id: i32) -> DomainResult<Vec<Property>> {
        self.repos.properties().list(user_id).await
    }

    pub async fn create(&self, user_id: i32, draft: PropertyDraft) -> DomainResult<Property> {
        let (Some(title), Some(address), Some(city)) = (
            non_blank(Some(&draft.title)),
            non_blank(Some(&draft.address)),
            non_blank(Some(&draft.city)),
        ) else {
            return Err(DomainError::invalid("INVALID_INPUT", REQUIRED_MESSAGE));
        };

        let draft = PropertyDraft {
            title: title.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            state: trimmed(draft.state),
            zip_code: trimmed(draft.zip_code),
            property_type: trimmed(draft.property_type),
            status: trimmed(draft.status),
            landlord_name: trimmed(draft.landlord_name),
            landlord_contact: trimmed(draft.landlord_contact),
            notes: trimmed(draft.notes),
        };
        self.repos.properties().create(user_id, draft).await
    }

    /// Required columns cannot be blanked by a patch.
    pub async fn update(&self, user_id: i32, id: i32, patch: PropertyPatch) -> DomainResult<Property> {
        let blanked = [&patch.title, &patch.address, &patch.city]
            .iter()
            .any(|v| matches!(v, Some(s) if s.trim().is_empty()));
        if blanked {
            return Err(DomainError::invalid("INVALID_INPUT", REQUIRED_MESSAGE));
        }
        self.repos
            .properties()
            .update(user_id, id, patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> DomainResult<()> {
        if self.repos.properties().delete(user_id, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user};
    use crate::domain::billing::PlanType;

    #[tokio::test]
    async fn create_requires_title_address_city() {
        let (db, repos) = repos().await;
        let uid = user(&db, "p@imobi.test", PlanType::Starter).await;
        let service = PropertyService::new(repos);

        let err = service
            .create(uid, PropertyDraft { title: "Apto".into(), address: " ".into(), city: "SP".into(), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Invalid { code: "INVALID_INPUT", .. }));

        let created = service
            .create(
                uid,
                PropertyDraft {
                    title: " Apto 12 ".into(),
                    address: "Rua C, 5".into(),
                    city: "Santos".into(),
                    state: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(created.title, "Apto 12");
        assert_eq!(created.state, None);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let (db, repos) = repos().await;
        let uid = user(&db, "p2@imobi.test", PlanType::Starter).await;
        let service = PropertyService::new(repos);

        let created = service
            .create(uid, PropertyDraft { title: "Casa".into(), address: "Rua D".into(), city: "Rio".into(), ..Default::default() })
            .await
            .unwrap();
        let updated = service
            .update(uid, created.id, PropertyPatch { notes: Some("Reformada".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("Reformada"));
        assert_eq!(updated.title, "Casa");

        service.delete(uid, created.id).await.unwrap();
        assert!(matches!(
            service.delete(uid, created.id).await,
            Err(DomainError::NotFound { entity: "Property", .. })
        ));
        assert!(service.update(uid, 4242, PropertyPatch::default()).await.is_err());
    }
}
