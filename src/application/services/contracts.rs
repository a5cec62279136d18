//! Lease contracts: listing, lookup and metered generation
//!
//! Generation validates the request in a fixed order so clients always see
//! the first problem, renders the lease text, then consumes one DOCUMENT
//! quota and inserts the contract in the same transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::contract::template::{
    LeaseAdmin, LeaseDates, LeasePayment, LeaseProperty, LeaseValues, UtilityCodes,
};
use crate::domain::contract::{
    build_contract_text, ContractFilter, ContractWithParties, LeaseTerms, NewContract, STATUS_ACTIVE,
};
use crate::domain::party::{Party, PartyRole};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::{digits_only, non_blank, normalize_filter, parse_flexible_date};

/// A number sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Blank strings count as zero; anything else non-numeric is `None`.
    pub fn parse(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) if s.trim().is_empty() => Some(0.0),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

/// Contract generation request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractInput {
    pub landlord_ids: Vec<String>,
    pub tenant_ids: Vec<String>,

    pub titulo: Option<String>,
    pub tipo: Option<String>,
    pub status: Option<String>,

    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub contract_duration_months: Option<NumberInput>,
    pub exemption_month: Option<NumberInput>,
    pub deposit_limit_date: Option<String>,
    pub contract_sign_limit_date: Option<String>,
    pub keys_delivery_date: Option<String>,

    pub rent_value: Option<NumberInput>,
    pub condo_value: Option<NumberInput>,
    pub iptu_value: Option<NumberInput>,
    pub deposit_value: Option<NumberInput>,
    pub total_monthly: Option<NumberInput>,
    pub insurance_reference_value: Option<NumberInput>,
    pub due_day: Option<NumberInput>,

    pub city: Option<String>,
    pub state: Option<String>,
    pub full_address: Option<String>,
    pub property_description: Option<String>,
    pub parking_spaces: Option<NumberInput>,
    pub parking_type: Option<String>,
    pub parking_number: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,

    pub rent_recipient_name: Option<String>,
    pub rent_recipient_cpf: Option<String>,
    pub bank_name: Option<String>,
    pub agency: Option<String>,
    pub account: Option<String>,
    pub pix_key: Option<String>,
    pub deposit_account_name: Option<String>,
    pub deposit_bank_name: Option<String>,
    pub deposit_agency: Option<String>,
    pub deposit_account: Option<String>,
    pub deposit_cpf: Option<String>,

    pub creci: Option<String>,
    pub admin_phone: Option<String>,
    pub admin_address: Option<String>,
    pub admin_name: Option<String>,
    pub admin_whatsapp: Option<String>,

    pub energy_code: Option<String>,
    pub gas_code: Option<String>,
    pub water_code: Option<String>,
}

/// Fields that passed validation, ready for the template and the insert.
struct ValidContract {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rent: f64,
    condo: Option<f64>,
    iptu: Option<f64>,
    deposit: Option<f64>,
    due_day: i64,
    duration_months: Option<i64>,
    city: String,
    state: String,
    full_address: String,
}

fn text(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

fn number_field(name: &str, value: &Option<NumberInput>) -> DomainResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) => v.parse().map(Some).ok_or_else(|| {
            DomainError::invalid("INVALID_NUMBER", format!("Campo {name} deve ser numérico."))
        }),
    }
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Steps 1-9 of the generation checks; party lookups come after.
fn validate(input: &ContractInput) -> DomainResult<ValidContract> {
    if dedup(&input.landlord_ids).is_empty() || dedup(&input.tenant_ids).is_empty() {
        return Err(DomainError::invalid(
            "MISSING_PARTIES",
            "Selecione ou cadastre pelo menos um locador e um locatário antes de gerar o contrato.",
        ));
    }

    let present_num = |v: &Option<NumberInput>| v.as_ref().filter(|n| !n.is_blank()).map(|_| "x");
    let missing: Vec<String> = [
        ("startDate", non_blank(input.start_date.as_deref())),
        ("endDate", non_blank(input.end_date.as_deref())),
        ("rentValue", present_num(&input.rent_value)),
        ("dueDay", present_num(&input.due_day)),
        ("city", non_blank(input.city.as_deref())),
        ("state", non_blank(input.state.as_deref())),
        ("fullAddress", non_blank(input.full_address.as_deref())),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_none())
    .map(|(name, _)| name.to_string())
    .collect();
    if !missing.is_empty() {
        return Err(DomainError::MissingFields {
            message: "Campos obrigatórios: startDate, endDate, rentValue, dueDay, city, state, fullAddress."
                .into(),
            fields: missing,
        });
    }

    let start = input.start_date.as_deref().and_then(parse_flexible_date);
    let end = input.end_date.as_deref().and_then(parse_flexible_date);
    let (Some(start), Some(end)) = (start, end) else {
        return Err(invalid_dates());
    };
    if end <= start {
        return Err(invalid_dates());
    }

    let rent = number_field("rentValue", &input.rent_value)?.unwrap_or_default();
    let condo = number_field("condoValue", &input.condo_value)?;
    let iptu = number_field("iptuValue", &input.iptu_value)?;
    let deposit = number_field("depositValue", &input.deposit_value)?;
    let due_day = number_field("dueDay", &input.due_day)?.unwrap_or_default();

    if !(1.0..=31.0).contains(&due_day) {
        return Err(DomainError::invalid(
            "INVALID_DUEDAY",
            "Dia de vencimento deve estar entre 1 e 31.",
        ));
    }

    let duration_months = match &input.contract_duration_months {
        None => None,
        Some(raw) => match raw.parse() {
            Some(months) if months > 0.0 => Some(whole(months)),
            _ => {
                return Err(DomainError::invalid(
                    "INVALID_DURATION",
                    "Prazo (meses) deve ser maior que zero.",
                ))
            }
        },
    };

    for (value, label) in [
        (&input.rent_recipient_cpf, "CPF do recebedor do aluguel"),
        (&input.deposit_cpf, "CPF da conta caução"),
    ] {
        let digits = digits_only(value.as_deref().unwrap_or_default());
        if !digits.is_empty() && digits.len() != 11 {
            return Err(DomainError::invalid(
                "INVALID_CPF",
                format!("{label} deve ter 11 dígitos numéricos."),
            ));
        }
    }

    if digits_only(input.agency.as_deref().unwrap_or_default()).len() > 5 {
        return Err(DomainError::invalid(
            "INVALID_AGENCY",
            "Agência deve ter no máximo 5 dígitos.",
        ));
    }

    let account = input.account.as_deref().unwrap_or_default().trim();
    let account_ok = account.is_empty()
        || (account.len() <= 13 && account.chars().all(|c| c.is_ascii_digit() || c == '-'));
    if !account_ok {
        return Err(DomainError::invalid(
            "INVALID_ACCOUNT",
            "Conta deve conter apenas dígitos e no máximo um hífen.",
        ));
    }

    Ok(ValidContract {
        start,
        end,
        rent,
        condo,
        iptu,
        deposit,
        due_day: due_day as i64,
        duration_months,
        city: text(&input.city).unwrap_or_default(),
        state: text(&input.state).unwrap_or_default(),
        full_address: text(&input.full_address).unwrap_or_default(),
    })
}

fn invalid_dates() -> DomainError {
    DomainError::invalid(
        "INVALID_DATES",
        "Datas de início e fim do contrato são obrigatórias e precisam ser válidas.",
    )
}

fn optional_number(value: &Option<NumberInput>) -> Option<f64> {
    value.as_ref().and_then(NumberInput::parse).filter(|n| *n != 0.0)
}

fn optional_date(value: &Option<String>) -> Option<DateTime<Utc>> {
    value.as_deref().and_then(parse_flexible_date)
}

pub struct ContractService {
    repos: Arc<dyn RepositoryProvider>,
}

impl ContractService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, user_id: i32, filter: ContractFilter) -> DomainResult<Vec<ContractWithParties>> {
        let filter = ContractFilter {
            status: normalize_filter(filter.status.as_deref()),
            tipo: normalize_filter(filter.tipo.as_deref()),
            q: normalize_filter(filter.q.as_deref()),
        };
        self.repos.contracts().list(user_id, filter).await
    }

    pub async fn get(&self, user_id: i32, id: &str) -> DomainResult<ContractWithParties> {
        self.repos
            .contracts()
            .find(user_id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Contract", "id", id))
    }

    async fn active_parties(&self, user_id: i32, role: PartyRole, ids: &[String]) -> DomainResult<Vec<Party>> {
        let found = self.repos.parties().find_active(user_id, role, ids).await?;
        if found.len() != ids.len() {
            return Err(match role {
                PartyRole::Landlord => DomainError::invalid(
                    "INVALID_LANDLORD",
                    "Alguns locadores informados não foram encontrados.",
                ),
                PartyRole::Tenant => DomainError::invalid(
                    "INVALID_TENANT",
                    "Alguns locatários informados não foram encontrados.",
                ),
            });
        }
        // Keep the order the client chose; it drives the signature block.
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(p) = found.iter().find(|p| &p.id == id) {
                ordered.push(p.clone());
            }
        }
        Ok(ordered)
    }

    pub async fn create(&self, user_id: i32, input: ContractInput) -> DomainResult<ContractWithParties> {
        let valid = validate(&input)?;
        let landlord_ids = dedup(&input.landlord_ids);
        let tenant_ids = dedup(&input.tenant_ids);
        let landlords = self.active_parties(user_id, PartyRole::Landlord, &landlord_ids).await?;
        let tenants = self.active_parties(user_id, PartyRole::Tenant, &tenant_ids).await?;

        // Agency details default to the company profile in settings.
        let settings = self.repos.settings().get().await?;
        let pick = |given: &Option<String>, fallback: &Option<String>| text(given).or_else(|| fallback.clone());

        let terms = LeaseTerms {
            landlords,
            tenants,
            property: LeaseProperty {
                full_address: valid.full_address.clone(),
                description: text(&input.property_description),
                parking_spaces: optional_number(&input.parking_spaces).map(whole),
                parking_type: text(&input.parking_type),
                parking_number: text(&input.parking_number),
                district: text(&input.district),
                postal_code: text(&input.postal_code),
                city: valid.city.clone(),
                state: valid.state.clone(),
            },
            dates: LeaseDates {
                start: valid.start,
                end: valid.end,
                duration_months: valid.duration_months,
                exemption_month: optional_number(&input.exemption_month).map(whole),
                deposit_limit: optional_date(&input.deposit_limit_date),
                sign_limit: optional_date(&input.contract_sign_limit_date),
                keys_delivery: optional_date(&input.keys_delivery_date),
            },
            values: LeaseValues {
                rent: valid.rent,
                condo: valid.condo,
                iptu: valid.iptu,
                deposit: valid.deposit,
                total_monthly: optional_number(&input.total_monthly),
            },
            payment: LeasePayment {
                due_day: valid.due_day,
                rent_recipient_name: text(&input.rent_recipient_name),
                rent_recipient_cpf: text(&input.rent_recipient_cpf),
                bank_name: text(&input.bank_name),
                agency: text(&input.agency),
                account: text(&input.account),
                pix_key: text(&input.pix_key),
                deposit_account_name: text(&input.deposit_account_name),
                deposit_bank_name: text(&input.deposit_bank_name),
                deposit_agency: text(&input.deposit_agency),
                deposit_account: text(&input.deposit_account),
                deposit_cpf: text(&input.deposit_cpf),
            },
            admin: LeaseAdmin {
                creci: pick(&input.creci, &settings.company_creci),
                phone: pick(&input.admin_phone, &settings.company_phone),
                address: pick(&input.admin_address, &settings.company_address),
                name: pick(&input.admin_name, &settings.company_name),
                whatsapp: pick(&input.admin_whatsapp, &settings.company_whatsapp),
            },
            insurance_reference: optional_number(&input.insurance_reference_value),
            utility_codes: UtilityCodes {
                energy: text(&input.energy_code),
                gas: text(&input.gas_code),
                water: text(&input.water_code),
            },
        };
        let generated_text = build_contract_text(&terms, Utc::now());

        let new = NewContract {
            titulo: text(&input.titulo)
                .unwrap_or_else(|| format!("Contrato de locação - {}/{}", valid.city, valid.state)),
            endereco: valid.full_address.clone(),
            tipo: text(&input.tipo).unwrap_or_else(|| "residencial".to_string()),
            status: text(&input.status).unwrap_or_else(|| STATUS_ACTIVE.to_string()),
            start_date: valid.start,
            end_date: valid.end,
            rent_value: whole(valid.rent),
            condo_value: valid.condo.map(whole),
            iptu_value: valid.iptu.map(whole),
            deposit_value: valid.deposit.map(whole),
            due_day: valid.due_day as i32,
            city: valid.city,
            state: valid.state,
            full_address: valid.full_address,
            property_description: text(&input.property_description),
            generated_text,
            landlord_ids,
            tenant_ids,
        };

        let created = self.repos.contracts().create_metered(user_id, new).await?;
        info!(user_id, contract_id = %created.contract.id, "Contract generated");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user};
    use crate::domain::billing::{PlanType, QuotaKind};
    use crate::domain::party::PersonFields;
    use sea_orm::DatabaseConnection;

    fn person(name: &str, cpf: &str) -> PersonFields {
        PersonFields {
            full_name: Some(name.into()),
            cpf: Some(cpf.into()),
            rg: Some("1234567".into()),
            rg_issuer: Some("SSP/SP".into()),
            nationality: Some("brasileiro(a)".into()),
            profession: Some("professor(a)".into()),
            marital_status: Some("SOLTEIRO".into()),
            address: Some("Rua E, 1".into()),
            ..Default::default()
        }
    }

    async fn setup(plan: PlanType) -> (DatabaseConnection, Arc<dyn RepositoryProvider>, i32, ContractInput) {
        let (db, repos) = repos().await;
        let uid = user(&db, "contratos@imobi.test", plan).await;
        let landlord = repos
            .parties()
            .create(uid, PartyRole::Landlord, person("Lia Locadora", "11111111111").validate().unwrap())
            .await
            .unwrap();
        let tenant = repos
            .parties()
            .create(uid, PartyRole::Tenant, person("Tito Inquilino", "22222222222").validate().unwrap())
            .await
            .unwrap();
        let input = ContractInput {
            landlord_ids: vec![landlord.id],
            tenant_ids: vec![tenant.id],
            start_date: Some("2026-01-01".into()),
            end_date: Some("2027-01-01".into()),
            rent_value: Some(NumberInput::Text("2500.6".into())),
            condo_value: Some(NumberInput::Number(400.0)),
            due_day: Some(NumberInput::Number(10.0)),
            city: Some("Campinas".into()),
            state: Some("SP".into()),
            full_address: Some("Av. Brasil, 100".into()),
            ..Default::default()
        };
        (db, repos, uid, input)
    }

    fn code(err: DomainError) -> &'static str {
        match err {
            DomainError::Invalid { code, .. } => code,
            DomainError::MissingFields { .. } => "VALIDATION_ERROR",
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn number_input_accepts_numbers_and_numeric_strings() {
        assert_eq!(NumberInput::Number(3.5).parse(), Some(3.5));
        assert_eq!(NumberInput::Text(" 12 ".into()).parse(), Some(12.0));
        assert_eq!(NumberInput::Text("".into()).parse(), Some(0.0));
        assert_eq!(NumberInput::Text("abc".into()).parse(), None);
    }

    #[test]
    fn validation_order() {
        let base = ContractInput {
            landlord_ids: vec!["l".into()],
            tenant_ids: vec!["t".into()],
            start_date: Some("2026-01-01".into()),
            end_date: Some("2026-12-31".into()),
            rent_value: Some(NumberInput::Number(1000.0)),
            due_day: Some(NumberInput::Number(5.0)),
            city: Some("SP".into()),
            state: Some("SP".into()),
            full_address: Some("Rua".into()),
            ..Default::default()
        };
        assert!(validate(&base).is_ok());

        let case = |f: fn(&mut ContractInput)| {
            let mut input = base.clone();
            f(&mut input);
            code(validate(&input).err().expect("should fail"))
        };

        assert_eq!(case(|i| i.tenant_ids.clear()), "MISSING_PARTIES");
        assert_eq!(case(|i| i.city = None), "VALIDATION_ERROR");
        assert_eq!(case(|i| i.rent_value = Some(NumberInput::Text("   ".into()))), "VALIDATION_ERROR");
        assert_eq!(case(|i| i.end_date = Some("2025-01-01".into())), "INVALID_DATES");
        assert_eq!(case(|i| i.start_date = Some("amanhã".into())), "INVALID_DATES");
        assert_eq!(case(|i| i.iptu_value = Some(NumberInput::Text("dez".into()))), "INVALID_NUMBER");
        assert_eq!(case(|i| i.due_day = Some(NumberInput::Number(32.0))), "INVALID_DUEDAY");
        assert_eq!(case(|i| i.contract_duration_months = Some(NumberInput::Number(0.0))), "INVALID_DURATION");
        assert_eq!(case(|i| i.rent_recipient_cpf = Some("123.456".into())), "INVALID_CPF");
        assert_eq!(case(|i| i.agency = Some("123456".into())), "INVALID_AGENCY");
        assert_eq!(case(|i| i.account = Some("12a-4".into())), "INVALID_ACCOUNT");

        // The first failing rule wins.
        assert_eq!(
            case(|i| {
                i.due_day = Some(NumberInput::Number(0.0));
                i.agency = Some("1234567".into());
            }),
            "INVALID_DUEDAY"
        );
    }

    #[tokio::test]
    async fn create_renders_text_and_applies_defaults() {
        let (_db, repos, uid, input) = setup(PlanType::Starter).await;
        let service = ContractService::new(repos.clone());

        let created = service.create(uid, input).await.unwrap();
        let c = &created.contract;
        assert_eq!(c.titulo, "Contrato de locação - Campinas/SP");
        assert_eq!(c.tipo, "residencial");
        assert_eq!(c.status, "ativo");
        assert_eq!(c.rent_value, 2501);
        assert_eq!(c.endereco, "Av. Brasil, 100");
        let text = c.generated_text.as_deref().unwrap();
        assert!(text.contains("Lia Locadora"));
        assert!(text.contains("R$ 2.500,60"));
        assert_eq!(created.landlords.len(), 1);

        let usage = repos.usage().get_or_create(uid, crate::domain::billing::UsagePeriod::current()).await.unwrap();
        assert_eq!(usage.count_for(QuotaKind::Document), 1);
    }

    #[tokio::test]
    async fn foreign_or_deleted_parties_are_rejected() {
        let (db, repos, uid, mut input) = setup(PlanType::Starter).await;
        let other = user(&db, "outro@imobi.test", PlanType::Starter).await;
        let service = ContractService::new(repos.clone());

        assert_eq!(code(service.create(other, input.clone()).await.unwrap_err()), "INVALID_LANDLORD");

        input.tenant_ids.push("nao-existe".into());
        assert_eq!(code(service.create(uid, input).await.unwrap_err()), "INVALID_TENANT");
    }

    #[tokio::test]
    async fn document_limit_blocks_the_sixteenth_contract() {
        let (_db, repos, uid, input) = setup(PlanType::Starter).await;
        let service = ContractService::new(repos.clone());

        for _ in 0..15 {
            service.create(uid, input.clone()).await.unwrap();
        }
        let err = service.create(uid, input).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.kind == QuotaKind::Document));
        assert_eq!(service.list(uid, ContractFilter::default()).await.unwrap().len(), 15);
    }
}
