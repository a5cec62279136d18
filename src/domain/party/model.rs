//! Tenants and landlords share one record shape, told apart by `PartyRole`.

use chrono::{DateTime, Utc};

use crate::shared::errors::DomainError;
use crate::shared::validations::{missing_fields, non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyRole {
    Tenant,
    Landlord,
}

impl PartyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "TENANT",
            Self::Landlord => "LANDLORD",
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::Tenant => "Tenant",
            Self::Landlord => "Landlord",
        }
    }

    /// Portuguese noun used in user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Tenant => "inquilino",
            Self::Landlord => "locador",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    Solteiro,
    Casado,
    UniaoEstavel,
    Divorciado,
    Viuvo,
}

impl MaritalStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SOLTEIRO" => Some(Self::Solteiro),
            "CASADO" => Some(Self::Casado),
            "UNIAO_ESTAVEL" => Some(Self::UniaoEstavel),
            "DIVORCIADO" => Some(Self::Divorciado),
            "VIUVO" => Some(Self::Viuvo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solteiro => "SOLTEIRO",
            Self::Casado => "CASADO",
            Self::UniaoEstavel => "UNIAO_ESTAVEL",
            Self::Divorciado => "DIVORCIADO",
            Self::Viuvo => "VIUVO",
        }
    }

    /// Wording used in the contract qualification paragraph.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Solteiro => "solteiro(a)",
            Self::Casado => "casado(a)",
            Self::UniaoEstavel => "em união estável",
            Self::Divorciado => "divorciado(a)",
            Self::Viuvo => "viúvo(a)",
        }
    }

    fn requires_spouse(&self) -> bool {
        matches!(self, Self::Casado | Self::UniaoEstavel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalRegime {
    ComunhaoParcial,
    ComunhaoTotal,
    SeparacaoTotal,
    Outro,
}

impl MaritalRegime {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMUNHAO_PARCIAL" => Some(Self::ComunhaoParcial),
            "COMUNHAO_TOTAL" => Some(Self::ComunhaoTotal),
            "SEPARACAO_TOTAL" => Some(Self::SeparacaoTotal),
            "OUTRO" => Some(Self::Outro),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComunhaoParcial => "COMUNHAO_PARCIAL",
            Self::ComunhaoTotal => "COMUNHAO_TOTAL",
            Self::SeparacaoTotal => "SEPARACAO_TOTAL",
            Self::Outro => "OUTRO",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub id: String,
    pub user_id: i32,
    pub role: PartyRole,
    pub full_name: String,
    pub cpf: String,
    pub rg: String,
    pub rg_issuer: String,
    pub nationality: String,
    pub profession: String,
    pub marital_status: MaritalStatus,
    pub marital_regime: Option<MaritalRegime>,
    pub spouse_name: Option<String>,
    pub spouse_cpf: Option<String>,
    pub spouse_rg: Option<String>,
    pub is_union_stable: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated party data, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyDraft {
    pub full_name: String,
    pub cpf: String,
    pub rg: String,
    pub rg_issuer: String,
    pub nationality: String,
    pub profession: String,
    pub marital_status: MaritalStatus,
    pub marital_regime: Option<MaritalRegime>,
    pub spouse_name: Option<String>,
    pub spouse_cpf: Option<String>,
    pub spouse_rg: Option<String>,
    pub is_union_stable: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
}

/// Raw person payload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct PersonFields {
    pub full_name: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub rg_issuer: Option<String>,
    pub nationality: Option<String>,
    pub profession: Option<String>,
    pub marital_status: Option<String>,
    pub marital_regime: Option<String>,
    pub spouse_name: Option<String>,
    pub spouse_cpf: Option<String>,
    pub spouse_rg: Option<String>,
    pub is_union_stable: Option<bool>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

const REQUIRED_MESSAGE: &str = "Campos obrigatórios: nome, CPF, RG, estado civil e endereço.";

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

impl PersonFields {
    pub fn validate(self) -> Result<PartyDraft, DomainError> {
        let missing = missing_fields(&[
            ("fullName", self.full_name.as_deref()),
            ("cpf", self.cpf.as_deref()),
            ("rg", self.rg.as_deref()),
            ("rgIssuer", self.rg_issuer.as_deref()),
            ("nationality", self.nationality.as_deref()),
            ("profession", self.profession.as_deref()),
            ("maritalStatus", self.marital_status.as_deref()),
            ("address", self.address.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(DomainError::MissingFields {
                message: REQUIRED_MESSAGE.to_string(),
                fields: missing,
            });
        }

        let status_raw = self.marital_status.as_deref().map(str::trim).unwrap_or_default();
        let marital_status = MaritalStatus::parse(status_raw).ok_or_else(|| {
            DomainError::invalid(
                "INVALID_MARITAL_STATUS",
                "Estado civil inválido. Use SOLTEIRO, CASADO, UNIAO_ESTAVEL, DIVORCIADO ou VIUVO.",
            )
        })?;

        let regime_raw = owned(self.marital_regime.as_deref());
        if marital_status == MaritalStatus::Casado && regime_raw.is_none() {
            return Err(DomainError::invalid(
                "MISSING_REGIME",
                "Regime de casamento é obrigatório quando casado(a).",
            ));
        }

        let spouse_name = owned(self.spouse_name.as_deref());
        if marital_status.requires_spouse() && spouse_name.is_none() {
            return Err(DomainError::invalid(
                "MISSING_SPOUSE",
                "Informe o nome do cônjuge para casados ou união estável.",
            ));
        }

        let marital_regime = match regime_raw.as_deref() {
            None => None,
            Some(raw) => Some(MaritalRegime::parse(raw).ok_or_else(|| {
                DomainError::invalid(
                    "INVALID_MARITAL_REGIME",
                    "Regime inválido. Use COMUNHAO_PARCIAL, COMUNHAO_TOTAL, SEPARACAO_TOTAL ou OUTRO.",
                )
            })?),
        };

        // Presence checked above.
        let req = |v: &Option<String>| owned(v.as_deref()).unwrap_or_default();

        Ok(PartyDraft {
            full_name: req(&self.full_name),
            cpf: req(&self.cpf),
            rg: req(&self.rg),
            rg_issuer: req(&self.rg_issuer),
            nationality: req(&self.nationality),
            profession: req(&self.profession),
            marital_status,
            marital_regime,
            spouse_name,
            spouse_cpf: owned(self.spouse_cpf.as_deref()),
            spouse_rg: owned(self.spouse_rg.as_deref()),
            is_union_stable: self
                .is_union_stable
                .unwrap_or(marital_status == MaritalStatus::UniaoEstavel),
            email: owned(self.email.as_deref()),
            phone: owned(self.phone.as_deref()),
            address: req(&self.address),
        })
    }
}

/// Short person reference embedded in contracts and notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct PartySummary {
    pub id: String,
    pub full_name: String,
    pub cpf: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Party> for PartySummary {
    fn from(party: &Party) -> Self {
        Self {
            id: party.id.clone(),
            full_name: party.full_name.clone(),
            cpf: party.cpf.clone(),
            email: party.email.clone(),
            phone: party.phone.clone(),
        }
    }
}

/// Contract reference listed next to each party.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedContract {
    pub id: String,
    pub titulo: String,
    pub endereco: String,
    pub status: String,
    pub tipo: String,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PartyWithContracts {
    pub party: Party,
    pub contracts: Vec<LinkedContract>,
}

/// How a delete request was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyDeletion {
    /// Linked to contracts; only `deleted_at` was set.
    Soft,
    Hard,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PersonFields {
        PersonFields {
            full_name: Some("Ana Souza".into()),
            cpf: Some("123.456.789-09".into()),
            rg: Some("12.345.678-9".into()),
            rg_issuer: Some("SSP/SP".into()),
            nationality: Some("brasileira".into()),
            profession: Some("engenheira".into()),
            marital_status: Some("SOLTEIRO".into()),
            address: Some("Rua A, 10, São Paulo/SP".into()),
            ..Default::default()
        }
    }

    fn code_of(err: DomainError) -> &'static str {
        match err {
            DomainError::Invalid { code, .. } => code,
            DomainError::MissingFields { .. } => "VALIDATION_ERROR",
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn accepts_single_person() {
        let draft = valid().validate().unwrap();
        assert_eq!(draft.marital_status, MaritalStatus::Solteiro);
        assert!(!draft.is_union_stable);
        assert_eq!(draft.email, None);
    }

    #[test]
    fn reports_missing_fields_by_name() {
        let fields = PersonFields {
            rg: Some("  ".into()),
            address: None,
            ..valid()
        };
        match fields.validate().unwrap_err() {
            DomainError::MissingFields { fields, message } => {
                assert_eq!(fields, vec!["rg", "address"]);
                assert_eq!(message, REQUIRED_MESSAGE);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn marital_rules_apply_in_order() {
        let bad_status = PersonFields {
            marital_status: Some("NAMORANDO".into()),
            ..valid()
        };
        assert_eq!(code_of(bad_status.validate().unwrap_err()), "INVALID_MARITAL_STATUS");

        let married_no_regime = PersonFields {
            marital_status: Some("CASADO".into()),
            spouse_name: Some("Bruno".into()),
            ..valid()
        };
        assert_eq!(code_of(married_no_regime.validate().unwrap_err()), "MISSING_REGIME");

        let married_no_spouse = PersonFields {
            marital_status: Some("CASADO".into()),
            marital_regime: Some("COMUNHAO_PARCIAL".into()),
            ..valid()
        };
        assert_eq!(code_of(married_no_spouse.validate().unwrap_err()), "MISSING_SPOUSE");

        let union_no_spouse = PersonFields {
            marital_status: Some("UNIAO_ESTAVEL".into()),
            ..valid()
        };
        assert_eq!(code_of(union_no_spouse.validate().unwrap_err()), "MISSING_SPOUSE");

        let bad_regime = PersonFields {
            marital_status: Some("CASADO".into()),
            marital_regime: Some("MISTO".into()),
            spouse_name: Some("Bruno".into()),
            ..valid()
        };
        assert_eq!(code_of(bad_regime.validate().unwrap_err()), "INVALID_MARITAL_REGIME");
    }

    #[test]
    fn stable_union_defaults_flag() {
        let draft = PersonFields {
            marital_status: Some("UNIAO_ESTAVEL".into()),
            spouse_name: Some("Carla".into()),
            ..valid()
        }
        .validate()
        .unwrap();
        assert!(draft.is_union_stable);
        assert_eq!(draft.spouse_name.as_deref(), Some("Carla"));
    }
}
