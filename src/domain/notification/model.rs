use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::party::PartySummary;
use crate::domain::property::PropertySummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    #[default]
    Pendente,
    Enviada,
    Arquivada,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "PENDENTE",
            Self::Enviada => "ENVIADA",
            Self::Arquivada => "ARQUIVADA",
        }
    }

    /// Case-insensitive; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PENDENTE" => Some(Self::Pendente),
            "ENVIADA" => Some(Self::Enviada),
            "ARQUIVADA" => Some(Self::Arquivada),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    CobrancaAluguelEmAtraso,
    CobrancaMultiplasParcelas,
    ReajusteAnualAluguel,
    AvisoReajusteAcimaIgpm,
    AvisoEntradaVistoria,
    AvisoSaidaVistoria,
    NotificacaoDescumprimentoClausula,
    NotificacaoObrasNaoAutorizadas,
    NotificacaoBarulhoVizinhanca,
    NotificacaoAnimaisCondominio,
    AvisoResilicaoAntecipada,
    AvisoFimContrato,
    AvisoRenovacaoProposta,
    CobrancaCondominioAtraso,
    CobrancaIptuAtraso,
    AdvertenciaFormal,
    UltimoAvisoExtrajudicial,
}

impl NotificationType {
    pub const ALL: [NotificationType; 17] = [
        Self::CobrancaAluguelEmAtraso,
        Self::CobrancaMultiplasParcelas,
        Self::ReajusteAnualAluguel,
        Self::AvisoReajusteAcimaIgpm,
        Self::AvisoEntradaVistoria,
        Self::AvisoSaidaVistoria,
        Self::NotificacaoDescumprimentoClausula,
        Self::NotificacaoObrasNaoAutorizadas,
        Self::NotificacaoBarulhoVizinhanca,
        Self::NotificacaoAnimaisCondominio,
        Self::AvisoResilicaoAntecipada,
        Self::AvisoFimContrato,
        Self::AvisoRenovacaoProposta,
        Self::CobrancaCondominioAtraso,
        Self::CobrancaIptuAtraso,
        Self::AdvertenciaFormal,
        Self::UltimoAvisoExtrajudicial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CobrancaAluguelEmAtraso => "COBRANCA_ALUGUEL_EM_ATRASO",
            Self::CobrancaMultiplasParcelas => "COBRANCA_MULTIPLAS_PARCELAS",
            Self::ReajusteAnualAluguel => "REAJUSTE_ANUAL_ALUGUEL",
            Self::AvisoReajusteAcimaIgpm => "AVISO_REAJUSTE_ACIMA_IGPM",
            Self::AvisoEntradaVistoria => "AVISO_ENTRADA_VISTORIA",
            Self::AvisoSaidaVistoria => "AVISO_SAIDA_VISTORIA",
            Self::NotificacaoDescumprimentoClausula => "NOTIFICACAO_DESCUMPRIMENTO_CLAUSULA",
            Self::NotificacaoObrasNaoAutorizadas => "NOTIFICACAO_OBRAS_NAO_AUTORIZADAS",
            Self::NotificacaoBarulhoVizinhanca => "NOTIFICACAO_BARULHO_VIZINHANCA",
            Self::NotificacaoAnimaisCondominio => "NOTIFICACAO_ANIMAIS_CONDOMINIO",
            Self::AvisoResilicaoAntecipada => "AVISO_RESILICAO_ANTECIPADA",
            Self::AvisoFimContrato => "AVISO_FIM_CONTRATO",
            Self::AvisoRenovacaoProposta => "AVISO_RENOVACAO_PROPOSTA",
            Self::CobrancaCondominioAtraso => "COBRANCA_CONDOMINIO_ATRASO",
            Self::CobrancaIptuAtraso => "COBRANCA_IPTU_ATRASO",
            Self::AdvertenciaFormal => "ADVERTENCIA_FORMAL",
            Self::UltimoAvisoExtrajudicial => "ULTIMO_AVISO_EXTRAJUDICIAL",
        }
    }

    /// Case-insensitive; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub property_id: Option<i32>,
    pub landlord_id: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A notification with the records it points at resolved.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub notification: Notification,
    pub property: Option<PropertySummary>,
    pub landlord: Option<PartySummary>,
    pub tenant: Option<PartySummary>,
}

/// Used for both create and full update.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub body: String,
    pub notification_type: NotificationType,
    pub status: NotificationStatus,
    pub property_id: Option<i32>,
    pub landlord_id: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
    pub property_id: Option<i32>,
    pub q: Option<String>,
}

/// Replaces `{name}` tokens with the matching variable. Unknown tokens are
/// left as they are so the user can still see what is missing.
pub fn render_template(body: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_token(&after[..end]) => {
                let key = &after[..end];
                match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_token(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_types_case_insensitively() {
        assert_eq!(
            NotificationType::parse("cobranca_iptu_atraso"),
            Some(NotificationType::CobrancaIptuAtraso)
        );
        assert_eq!(NotificationType::parse("OUTRO"), None);
        assert_eq!(NotificationStatus::parse("enviada"), Some(NotificationStatus::Enviada));
        assert_eq!(NotificationStatus::parse(""), None);
    }

    #[test]
    fn render_fills_known_tokens_and_keeps_unknown() {
        let mut vars = HashMap::new();
        vars.insert("nome_locatario".to_string(), "Ana".to_string());
        let out = render_template("Prezado(a) {nome_locatario}, prazo {prazo_dias} dias.", &vars);
        assert_eq!(out, "Prezado(a) Ana, prazo {prazo_dias} dias.");
    }

    #[test]
    fn render_ignores_braces_that_are_not_tokens() {
        let vars = HashMap::new();
        assert_eq!(render_template("a { b } {", &vars), "a { b } {");
    }
}
