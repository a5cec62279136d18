//! Legal assistant chat and AI health
//!
//! Every question is wrapped in the legal-mentor system prompt plus a short
//! instruction for the requested mode.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::ports::{AiError, AiPart, AiProvider, AiTask};
use crate::domain::{DomainError, DomainResult};

const SYSTEM_PROMPT: &str = "Você é o Imobi Contract Legal Mentor, um advogado virtual especializado em direito imobiliário brasileiro (Lei do Inquilinato 8.245/1991, Código Civil e CPC).

Instruções gerais:
- Responda SEMPRE em português claro, com tom profissional e sem juridiquês desnecessário.
- Nunca invente artigos ou leis; se não tiver certeza, diga para consultar a legislação ou um advogado local.
- Oriente corretores, proprietários, locatários e imobiliárias em cenários de locação residencial e comercial.
- As respostas são apoio e não substituem parecer jurídico formal; lembre disso de forma breve.";

const CLOSING: &str = "Responda em português do Brasil, de forma estruturada, em tópicos quando fizer sentido, direta e prática.
Reforce segurança jurídica e lembre que um advogado deve revisar antes de uso com cliente.";

const PING_PROMPT: &str = "Responda apenas \"pong\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Mentor,
    Contract,
    Notification,
    Inspection,
}

impl ChatMode {
    /// Unknown or absent modes fall back to the mentor.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some("contract") => Self::Contract,
            Some("notification") => Self::Notification,
            Some("inspection") => Self::Inspection,
            _ => Self::Mentor,
        }
    }

    pub fn task(&self) -> AiTask {
        match self {
            Self::Mentor => AiTask::Mentor,
            Self::Contract => AiTask::Contract,
            Self::Notification => AiTask::Notification,
            Self::Inspection => AiTask::Inspection,
        }
    }

    fn fallback_reply(&self) -> &'static str {
        match self {
            Self::Mentor => "Sou o Mentor Jurídico. Posso orientar sobre Lei do Inquilinato, Código Civil e CPC.",
            Self::Contract => "Aqui vou te ajudar a gerar um rascunho de contrato. Informe tipo, partes e endereço que sugiro cláusulas.",
            Self::Notification => "Aqui vou te ajudar a gerar uma notificação. Diga destinatário, assunto e contexto que monto um texto base.",
            Self::Inspection => "Aqui vou te ajudar a montar uma vistoria. Diga endereço, tipo (entrada/saída) e pontos principais.",
        }
    }
}

fn mode_instruction(task: AiTask) -> &'static str {
    match task {
        AiTask::Contract => "Modo CONTRATO: sugira um esqueleto de cláusulas (partes, objeto, prazo, valor/garantias, obrigações, reajuste, rescisão, vistoria). Seja conciso e estruturado.",
        AiTask::Notification => "Modo NOTIFICAÇÃO: sugira um corpo breve (saudação, contexto, fundamento, pedido/prazo, consequência). Tom firme e respeitoso.",
        AiTask::Inspection => "Modo VISTORIA: ofereça checklist de ambientes (piso, pintura, portas/janelas, elétrica, hidráulica, fotos).",
        AiTask::Summary => "Modo RESUMO: produza resposta curta e direta, priorizando bullets objetivos.",
        AiTask::Mentor => "Modo MENTOR: explique conceito, riscos e próximos passos práticos para locação residencial/comercial.",
    }
}

pub fn build_prompt(task: AiTask, message: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n{}\n\nPergunta do usuário:\n\"{message}\"\n\n{CLOSING}",
        mode_instruction(task)
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Gemini,
    Fallback,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
    pub mode: ChatMode,
    pub source: ReplySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiHealth {
    pub ok: bool,
    pub has_key: bool,
    pub message: String,
    pub model: Option<String>,
    pub status: &'static str,
}

pub struct AssistantService {
    ai: Arc<dyn AiProvider>,
}

impl AssistantService {
    pub fn new(ai: Arc<dyn AiProvider>) -> Self {
        Self { ai }
    }

    pub async fn ask(&self, mode: ChatMode, message: &str) -> Result<String, AiError> {
        let task = mode.task();
        let reply = self
            .ai
            .generate(task, vec![AiPart::Text(build_prompt(task, message))])
            .await?;
        Ok(reply.text)
    }

    /// Never fails once the message is valid: AI errors turn into a canned
    /// reply marked as fallback.
    pub async fn chat(&self, message: Option<&str>, mode: Option<&str>) -> DomainResult<ChatReply> {
        let message = message.filter(|m| !m.is_empty()).ok_or_else(|| {
            DomainError::invalid(
                "INVALID_INPUT",
                "Campo \"message\" é obrigatório e deve ser uma string.",
            )
        })?;
        let mode = ChatMode::parse_or_default(mode);

        match self.ask(mode, message).await {
            Ok(reply) => Ok(ChatReply {
                reply,
                mode,
                source: ReplySource::Gemini,
                error: None,
            }),
            Err(err) => {
                warn!(error = %err, mode = ?mode, "Chat fell back to canned reply");
                Ok(ChatReply {
                    reply: format!("{} (resposta genérica por fallback).", mode.fallback_reply()),
                    mode,
                    source: ReplySource::Fallback,
                    error: Some(err.to_string()),
                })
            }
        }
    }

    pub async fn health(&self) -> AiHealth {
        let summary_model = || {
            self.ai
                .candidates(AiTask::Summary)
                .into_iter()
                .next()
                .unwrap_or_else(|| AiTask::Summary.default_model().to_string())
        };

        if !self.ai.has_key() {
            return AiHealth {
                ok: false,
                has_key: false,
                message: "Gemini não configurado. Defina GOOGLE_API_KEY.".into(),
                model: Some(AiTask::Summary.default_model().to_string()),
                status: "degraded",
            };
        }

        match self
            .ai
            .generate(AiTask::Summary, vec![AiPart::Text(PING_PROMPT.to_string())])
            .await
        {
            Ok(reply) => {
                let ok = reply.text.to_lowercase().contains("pong");
                AiHealth {
                    ok,
                    has_key: true,
                    message: if ok {
                        "Gemini respondeu ao ping.".into()
                    } else {
                        "Gemini respondeu, mas não confirmou ping.".into()
                    },
                    model: Some(reply.model),
                    status: if ok { "ok" } else { "degraded" },
                }
            }
            Err(err) => {
                error!(error = %err, "Gemini health check failed");
                AiHealth {
                    ok: false,
                    has_key: true,
                    message: err.to_string(),
                    model: Some(summary_model()),
                    status: "degraded",
                }
            }
        }
    }
}
