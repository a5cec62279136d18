//! Residential lease text
//!
//! The clause text lives in `lease_template.txt` with `{{name}}` slots.
//! Everything a user did not provide is rendered as a bracketed placeholder
//! so the document can be completed by hand.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::party::{MaritalRegime, MaritalStatus, Party};

const LEASE_TEMPLATE: &str = include_str!("lease_template.txt");
const DATE_PLACEHOLDER: &str = "[preencher data]";
const SIGNATURE_LINE: &str = "_________________________________________";

#[derive(Debug, Clone, Default)]
pub struct LeaseProperty {
    pub full_address: String,
    pub description: Option<String>,
    pub parking_spaces: Option<i64>,
    pub parking_type: Option<String>,
    pub parking_number: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone)]
pub struct LeaseDates {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_months: Option<i64>,
    pub exemption_month: Option<i64>,
    pub deposit_limit: Option<DateTime<Utc>>,
    pub sign_limit: Option<DateTime<Utc>>,
    pub keys_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaseValues {
    pub rent: f64,
    pub condo: Option<f64>,
    pub iptu: Option<f64>,
    pub deposit: Option<f64>,
    pub total_monthly: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct LeasePayment {
    pub due_day: i64,
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
}

/// Real-estate agency administering the lease.
#[derive(Debug, Clone, Default)]
pub struct LeaseAdmin {
    pub creci: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UtilityCodes {
    pub energy: Option<String>,
    pub gas: Option<String>,
    pub water: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LeaseTerms {
    pub landlords: Vec<Party>,
    pub tenants: Vec<Party>,
    pub property: LeaseProperty,
    pub dates: LeaseDates,
    pub values: LeaseValues,
    pub payment: LeasePayment,
    pub admin: LeaseAdmin,
    pub insurance_reference: Option<f64>,
    pub utility_codes: UtilityCodes,
}

// ── Formatting helpers ──────────────────────────────────────────

/// `dd/mm/yyyy`, or a fill-in marker.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

/// Brazilian currency notation: `R$ 1.234,56`.
pub fn format_money(value: f64) -> String {
    let amount = Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let plain = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {}{},{}", if negative { "-" } else { "" }, grouped, frac_part)
}

pub fn value_or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// `a; b e c`
pub fn join_with_e(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} e {}", init.join("; "), last),
    }
}

fn regime_label(regime: Option<MaritalRegime>) -> String {
    match regime {
        None | Some(MaritalRegime::Outro) => "comunhão parcial de bens".to_string(),
        Some(r) => r.as_str().replacen('_', " ", 1).to_lowercase(),
    }
}

pub fn format_marital_status(person: &Party) -> String {
    let base = person.marital_status.label();
    let spouse_docs = || {
        format!(
            "{}, {}",
            value_or_placeholder(person.spouse_rg.as_deref(), "RG nº ..."),
            value_or_placeholder(person.spouse_cpf.as_deref(), "CPF nº ...")
        )
    };

    match (person.marital_status, person.spouse_name.as_deref()) {
        (MaritalStatus::Casado, Some(spouse)) => format!(
            "{} sob o regime da {} com {}, {}",
            base,
            regime_label(person.marital_regime),
            spouse,
            spouse_docs()
        ),
        (MaritalStatus::Casado, None) => format!("{} sob o regime informado", base),
        (MaritalStatus::UniaoEstavel, Some(spouse)) => {
            format!("em união estável com {}, {}", spouse, spouse_docs())
        }
        _ => base.to_string(),
    }
}

/// Qualification paragraph for one signatory.
pub fn format_person_as_party(person: &Party) -> String {
    format!(
        "{}, {}, {}, portador(a) da cédula de identidade RG nº {} {}, inscrito(a) no CPF/MF sob nº {}, {}, residente e domiciliado(a) à {}",
        person.full_name,
        person.nationality,
        person.profession,
        person.rg,
        person.rg_issuer,
        person.cpf,
        format_marital_status(person),
        person.address
    )
}

/// Whole months between the dates (30-day months, at least one) unless
/// given explicitly.
pub fn duration_months(dates: &LeaseDates) -> i64 {
    if let Some(months) = dates.duration_months.filter(|m| *m > 0) {
        return months;
    }
    let seconds = (dates.end - dates.start).num_seconds() as f64;
    ((seconds / (86_400.0 * 30.0)).round() as i64).max(1)
}

/// Replaces every `{{key}}` found in `values`; unknown keys stay verbatim.
pub fn render_slots(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len() + 1024);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ── Document ────────────────────────────────────────────────────

pub fn build_contract_text(terms: &LeaseTerms, today: DateTime<Utc>) -> String {
    let landlords: Vec<String> = terms.landlords.iter().map(format_person_as_party).collect();
    let tenants: Vec<String> = terms.tenants.iter().map(format_person_as_party).collect();

    let v = &terms.values;
    let total_monthly = v
        .total_monthly
        .unwrap_or(v.rent + v.condo.unwrap_or(0.0) + v.iptu.unwrap_or(0.0));
    let insurance = terms
        .insurance_reference
        .filter(|value| *value != 0.0)
        .unwrap_or(v.rent * 20.0);

    let p = &terms.payment;
    let a = &terms.admin;
    let prop = &terms.property;
    let d = &terms.dates;
    let opt = |value: &Option<String>, placeholder: &str| value_or_placeholder(value.as_deref(), placeholder);
    let signature = |people: &[Party], idx: usize| {
        people
            .get(idx)
            .map(|person| person.full_name.clone())
            .unwrap_or_else(|| SIGNATURE_LINE.to_string())
    };

    let slots: HashMap<&str, String> = HashMap::from([
        ("admin_name", opt(&a.name, "[NOME_ADMINISTRADORA]")),
        ("admin_creci", opt(&a.creci, "[CRECI_IMOBILIARIA]")),
        ("admin_phone", opt(&a.phone, "[TELEFONE_IMOBILIARIA]")),
        ("admin_address", opt(&a.address, "[ENDERECO_COMPLETO_IMOBILIARIA]")),
        ("admin_whatsapp", opt(&a.whatsapp, "[WHATSAPP_ADMINISTRADORA]")),
        ("landlords", join_with_e(&landlords)),
        ("tenants", join_with_e(&tenants)),
        ("full_address", prop.full_address.clone()),
        (
            "property_description",
            opt(
                &prop.description,
                "[DESCRIÇÃO_COMPLEMENTO_IMOVEL – bloco, torre, nº do apartamento]",
            ),
        ),
        ("parking_spaces", prop.parking_spaces.unwrap_or(0).to_string()),
        ("parking_type", opt(&prop.parking_type, "coberta/descoberta")),
        ("parking_number", opt(&prop.parking_number, "nº vaga")),
        ("district", opt(&prop.district, "[Bairro]")),
        ("postal_code", opt(&prop.postal_code, "[CEP]")),
        ("city", prop.city.clone()),
        ("state", prop.state.clone()),
        ("city_upper", prop.city.to_uppercase()),
        ("duration_months", duration_months(d).to_string()),
        ("start_date", format_date(Some(d.start))),
        ("end_date", format_date(Some(d.end))),
        ("exemption_month", d.exemption_month.unwrap_or(0).to_string()),
        ("rent_value", format_money(v.rent)),
        ("condo_value", format_money(v.condo.unwrap_or(0.0))),
        ("iptu_value", format_money(v.iptu.unwrap_or(0.0))),
        ("total_monthly", format_money(total_monthly)),
        ("due_day", p.due_day.to_string()),
        ("rent_recipient_name", opt(&p.rent_recipient_name, "[NOME_TITULAR_CONTA_RECEBIMENTO]")),
        ("rent_recipient_cpf", opt(&p.rent_recipient_cpf, "[CPF_TITULAR_CONTA_RECEBIMENTO]")),
        ("bank_name", opt(&p.bank_name, "[NOME_BANCO]")),
        ("agency", opt(&p.agency, "[NUMERO_AGENCIA]")),
        ("account", opt(&p.account, "[NUMERO_CONTA]")),
        ("pix_key", opt(&p.pix_key, "[CHAVE_PIX_RECEBIMENTO]")),
        ("deposit_value", format_money(v.deposit.unwrap_or(0.0))),
        ("deposit_limit_date", format_date(d.deposit_limit)),
        ("deposit_account_name", opt(&p.deposit_account_name, "[NOME_TITULAR_CONTA_CAUCAO]")),
        ("deposit_bank_name", opt(&p.deposit_bank_name, "[NOME_BANCO_CAUCAO]")),
        ("deposit_agency", opt(&p.deposit_agency, "[AGENCIA_CAUCAO]")),
        ("deposit_account", opt(&p.deposit_account, "[TIPO_E_NUMERO_CONTA_CAUCAO]")),
        ("deposit_cpf", opt(&p.deposit_cpf, "[CPF_TITULAR_CONTA_CAUCAO]")),
        ("contract_sign_limit_date", format_date(d.sign_limit)),
        ("keys_delivery_date", format_date(d.keys_delivery)),
        ("signature_date", format_date(Some(d.sign_limit.unwrap_or(today)))),
        ("insurance_reference", format_money(insurance)),
        ("energy_code", opt(&terms.utility_codes.energy, "[CODIGO_INSTALACAO_ENERGIA]")),
        ("gas_code", opt(&terms.utility_codes.gas, "[CODIGO_USUARIO_GAS]")),
        ("water_code", opt(&terms.utility_codes.water, "[CODIGO_CADASTRO_AGUA_ESGOTO]")),
        ("landlord_signature_1", signature(&terms.landlords, 0)),
        ("landlord_signature_2", signature(&terms.landlords, 1)),
        ("tenant_signature_1", signature(&terms.tenants, 0)),
        ("tenant_signature_2", signature(&terms.tenants, 1)),
    ]);

    render_slots(LEASE_TEMPLATE, &slots).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::party::PartyRole;
    use chrono::TimeZone;

    fn person(name: &str, status: MaritalStatus) -> Party {
        let now = Utc::now();
        Party {
            id: format!("id-{name}"),
            user_id: 1,
            role: PartyRole::Tenant,
            full_name: name.to_string(),
            cpf: "123.456.789-09".into(),
            rg: "12.345.678-9".into(),
            rg_issuer: "SSP/SP".into(),
            nationality: "brasileiro(a)".into(),
            profession: "professor(a)".into(),
            marital_status: status,
            marital_regime: None,
            spouse_name: None,
            spouse_cpf: None,
            spouse_rg: None,
            is_union_stable: false,
            email: None,
            phone: None,
            address: "Rua das Flores, 100".into(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn terms() -> LeaseTerms {
        LeaseTerms {
            landlords: vec![person("Maria Lima", MaritalStatus::Solteiro)],
            tenants: vec![
                person("João Silva", MaritalStatus::Divorciado),
                person("Paula Reis", MaritalStatus::Viuvo),
            ],
            property: LeaseProperty {
                full_address: "Av. Paulista, 1000, ap 51".into(),
                city: "São Paulo".into(),
                state: "SP".into(),
                ..Default::default()
            },
            dates: LeaseDates {
                start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2027, 7, 1, 0, 0, 0).unwrap(),
                duration_months: None,
                exemption_month: Some(12),
                deposit_limit: None,
                sign_limit: None,
                keys_delivery: None,
            },
            values: LeaseValues {
                rent: 3500.0,
                condo: Some(800.5),
                iptu: Some(120.0),
                deposit: Some(10500.0),
                total_monthly: None,
            },
            payment: LeasePayment {
                due_day: 5,
                bank_name: Some("Banco do Brasil".into()),
                ..Default::default()
            },
            admin: LeaseAdmin::default(),
            insurance_reference: None,
            utility_codes: UtilityCodes::default(),
        }
    }

    #[test]
    fn money_uses_brazilian_separators() {
        assert_eq!(format_money(1234.56), "R$ 1.234,56");
        assert_eq!(format_money(0.0), "R$ 0,00");
        assert_eq!(format_money(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_money(999.999), "R$ 1.000,00");
        assert_eq!(format_money(-50.5), "R$ -50,50");
    }

    #[test]
    fn joins_parties_with_final_e() {
        let items = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(join_with_e(&items), "A; B e C");
        assert_eq!(join_with_e(&items[..1]), "A");
        assert_eq!(join_with_e(&[]), "");
    }

    #[test]
    fn married_person_mentions_regime_and_spouse() {
        let mut p = person("Carlos", MaritalStatus::Casado);
        p.spouse_name = Some("Rita".into());
        p.marital_regime = Some(MaritalRegime::SeparacaoTotal);
        assert_eq!(
            format_marital_status(&p),
            "casado(a) sob o regime da separacao total com Rita, RG nº ..., CPF nº ..."
        );

        p.marital_regime = Some(MaritalRegime::Outro);
        p.spouse_rg = Some("RG 1".into());
        assert!(format_marital_status(&p).contains("regime da comunhão parcial de bens com Rita, RG 1"));

        p.spouse_name = None;
        assert_eq!(format_marital_status(&p), "casado(a) sob o regime informado");
    }

    #[test]
    fn stable_union_wording() {
        let mut p = person("Lia", MaritalStatus::UniaoEstavel);
        assert_eq!(format_marital_status(&p), "em união estável");
        p.spouse_name = Some("Téo".into());
        p.spouse_cpf = Some("999".into());
        assert_eq!(format_marital_status(&p), "em união estável com Téo, RG nº ..., 999");
    }

    #[test]
    fn duration_falls_back_to_thirty_day_months() {
        let t = terms();
        assert_eq!(duration_months(&t.dates), 30);
        let explicit = LeaseDates {
            duration_months: Some(24),
            ..t.dates.clone()
        };
        assert_eq!(duration_months(&explicit), 24);
        let same_day = LeaseDates {
            end: t.dates.start,
            ..t.dates
        };
        assert_eq!(duration_months(&same_day), 1);
    }

    #[test]
    fn full_document_fills_every_slot() {
        let today = Utc.with_ymd_and_hms(2024, 12, 20, 10, 0, 0).unwrap();
        let text = build_contract_text(&terms(), today);

        assert!(!text.contains("{{"));
        assert!(text.starts_with("[NOME_ADMINISTRADORA]\nCRECI [CRECI_IMOBILIARIA]"));
        assert!(text.contains("LOCADORES: Maria Lima, brasileiro(a), professor(a)"));
        assert!(text.contains("divorciado(a), residente e domiciliado(a) à Rua das Flores, 100 e Paula Reis"));
        assert!(text.contains("é de 30 meses, iniciando-se em\n01/01/2025"));
        assert!(text.contains("totalizando R$ 4.420,50"));
        assert!(text.contains("Banco Banco do Brasil, Agência [NUMERO_AGENCIA]"));
        assert!(text.contains("hoje estimado em R$ 70.000,00"));
        assert!(text.contains("Foro da Comarca de São Paulo/SP"));
        assert!(text.contains("SÃO PAULO, 20/12/2024."));
        assert!(text.contains("LOCATÁRIOS\n_________________________________________\nJoão Silva"));
        assert!(text.ends_with("ENDEREÇO:"));
    }

    #[test]
    fn unknown_slots_survive_rendering() {
        let values = HashMap::from([("a", "1".to_string())]);
        assert_eq!(render_slots("{{a}} {{b}} {{", &values), "1 {{b}} {{");
    }
}
