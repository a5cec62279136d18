//! Property inspections and AI photo analysis

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::inspection::{
    addendum_entry, append_report_entry, extract_json_object, manual_note_entry,
    normalize_vision_report, AnalysisMetadata, Inspection, InspectionAnalysis, InspectionFilter,
    InspectionImage, NewInspection, STATUS_PENDING,
};
use crate::domain::party::PartyRole;
use crate::domain::ports::{AiError, AiPart, AiProvider, AiTask};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::validations::{missing_fields, non_blank, normalize_filter, parse_flexible_date};

pub const MAX_ANALYZE_FILES: usize = 10;
pub const MAX_ANALYZE_FILE_BYTES: usize = 5 * 1024 * 1024;

const INSPECTION_SYSTEM_PROMPT: &str = "Você é um perito de vistorias imobiliárias (locação no Brasil), com foco técnico (não jurídico).
- Analise fotos de vistoria de entrada, saída ou cautelar.
- Sempre descreva o ambiente/móvel de forma neutra, mesmo quando não houver danos.
- Identifique danos visíveis: pintura, piso, azulejos, portas, janelas, vidros, armários, hidráulica aparente, elétrica aparente, infiltração, mofo, rachaduras, riscos, amassados, ferrugem.
- Classifique severidade como \"sem_danos\", \"leve\", \"moderado\" ou \"grave\".
- Recomende ações práticas: pintar, trocar peça, revisar elétrica/hidráulica, secar e tratar mofo, substituir componente, solicitar vistoria presencial.
- Seja conservador: use \"aparente\" ou \"indício de\" quando não houver certeza e recomende verificação presencial.
- Responda SEMPRE em português do Brasil, em JSON estrito no formato solicitado.
- Não faça afirmações jurídicas ou garantias; apenas orientação técnica.";

const REPORT_FORMAT: &str = r#"Analise as fotos a seguir e produza um LAUDO rico. Responda APENAS com JSON neste formato:
{
  "header": {
    "tipoVistoria": "ENTRADA|SAIDA|VISTORIA_AVULSA",
    "data": "string",
    "cidadeUf": "string",
    "enderecoImovel": "string",
    "locadores": ["string"],
    "locatarios": ["string"],
    "objetoVistoria": "string"
  },
  "resumoGeral": "2 a 3 parágrafos detalhando estado geral, pontos críticos e recomendações",
  "ambientes": [
    {
      "ambiente": "Sala|Cozinha|Quarto 1|Banheiro social|Área de serviço|etc",
      "resumoAmbiente": "parágrafo descrevendo acabamentos, iluminação, conservação",
      "itens": [
        {
          "item": "Armário|Piso|Paredes|Teto|Porta|Janela|Bancada|Louça sanitária|Metais|etc",
          "estadoGeral": "descrição neutra e detalhada, mesmo sem danos",
          "haDanos": true|false,
          "severidade": "sem_danos|leve|moderado|grave",
          "descricaoDanos": "detalhes do dano se existir",
          "possiveisCausas": "causas prováveis",
          "riscosSeNaoTratar": "o que pode acontecer se não corrigir",
          "acaoRecomendada": "passo a passo curto do reparo/prioridade"
        }
      ]
    }
  ],
  "fotos": [
    {
      "fotoId": "string",
      "ambiente": "string",
      "itemRelacionado": "string opcional",
      "resumoCurto": "1-2 frases sobre o que a foto mostra",
      "severidade": "sem_danos|leve|moderado|grave",
      "descricaoDanos": "se houver",
      "possiveisCausas": "se houver",
      "riscosSeNaoTratar": "se houver",
      "acaoRecomendada": "se houver"
    }
  ]
}
Regras: sempre descreva o ambiente mesmo sem dano; use textos técnicos e detalhados, estruturados nos campos (não junte tudo em um bloco único)."#;

/// Create request. `aiJson` may arrive as an object or as serialized text.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionInput {
    pub endereco: Option<String>,
    pub tipo: Option<String>,
    pub status: Option<String>,
    pub data: Option<String>,
    pub created_from_ai: Option<bool>,
    pub ai_summary: Option<String>,
    #[schema(value_type = Object)]
    pub ai_json: Option<Value>,
    pub observacoes: Option<String>,
    pub contract_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// A photo received for analysis.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub original_name: Option<String>,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    pub endereco: Option<String>,
    pub tipo: Option<String>,
    pub observacoes: Option<String>,
    pub ambientes: Vec<String>,
    pub notas: Vec<String>,
    pub metadata: AnalysisMetadata,
    pub files: Vec<UploadedImage>,
}

fn not_found(id: i32) -> DomainError {
    DomainError::not_found("Inspection", "id", id)
}

fn owned(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}

fn vision_prompt(endereco: &str, tipo: &str, observacoes: Option<&str>, metadata: &AnalysisMetadata) -> String {
    format!(
        "{INSPECTION_SYSTEM_PROMPT}\n\nDados da vistoria:\n- Endereço: {endereco}\n- Tipo de vistoria: {tipo}\n- Observações gerais: {obs}\n- Locadores: {locadores}\n- Locatários: {locatarios}\n- Cidade/UF: {cidade}\n- Tipo de vistoria (entrada/saída): {tipo_vistoria}\n- Objeto da vistoria: {objeto}\n\n{REPORT_FORMAT}\n",
        obs = observacoes.unwrap_or("Nenhuma"),
        locadores = metadata.locadores_or_default().join(", "),
        locatarios = metadata.locatarios_or_default().join(", "),
        cidade = metadata.cidade_uf.as_deref().unwrap_or("não informada"),
        tipo_vistoria = metadata.tipo_vistoria.as_deref().unwrap_or("não informado"),
        objeto = metadata.objeto_vistoria.as_deref().unwrap_or("não informado"),
    )
}

fn photo_parts(images: &[InspectionImage]) -> Vec<AiPart> {
    images
        .iter()
        .flat_map(|img| {
            let ambiente = non_blank(Some(&img.ambiente)).unwrap_or("não informado");
            let nota = non_blank(Some(&img.nota)).unwrap_or("sem nota");
            [
                AiPart::Text(format!("Foto {} | ambiente: {ambiente} | nota: {nota}", img.foto_id)),
                AiPart::InlineData {
                    mime_type: img.mime_type.clone(),
                    base64: img.base64.clone(),
                },
            ]
        })
        .collect()
}

fn analyze_failed(detail: impl Into<String>) -> DomainError {
    DomainError::Failed {
        code: "AI_ANALYZE_ERROR",
        message: "Não foi possível analisar as fotos com IA no momento. Tente novamente em instantes.".into(),
        detail: detail.into(),
    }
}

pub struct InspectionService {
    repos: Arc<dyn RepositoryProvider>,
    ai: Arc<dyn AiProvider>,
}

impl InspectionService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, ai: Arc<dyn AiProvider>) -> Self {
        Self { repos, ai }
    }

    pub async fn list(
        &self,
        user_id: i32,
        status: Option<&str>,
        tipo: Option<&str>,
        q: Option<&str>,
    ) -> DomainResult<Vec<Inspection>> {
        let filter = InspectionFilter {
            status: normalize_filter(status),
            tipo: normalize_filter(tipo),
            q: non_blank(q).map(str::to_string),
        };
        self.repos.inspections().list(user_id, filter).await
    }

    pub async fn get(&self, user_id: i32, id: i32) -> DomainResult<Inspection> {
        self.repos.inspections().find(user_id, id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, user_id: i32, input: InspectionInput) -> DomainResult<Inspection> {
        let missing = missing_fields(&[
            ("endereco", input.endereco.as_deref()),
            ("tipo", input.tipo.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(DomainError::MissingFields {
                message: "Campos obrigatórios: endereco, tipo.".into(),
                fields: missing,
            });
        }

        let contract_id = owned(&input.contract_id);
        if let Some(id) = &contract_id {
            if !self.repos.contracts().exists(user_id, id).await? {
                return Err(DomainError::invalid(
                    "INVALID_CONTRACT",
                    "Contrato vinculado não encontrado.",
                ));
            }
        }
        let tenant_id = owned(&input.tenant_id);
        if let Some(id) = &tenant_id {
            if self.repos.parties().find(user_id, PartyRole::Tenant, id).await?.is_none() {
                return Err(DomainError::invalid(
                    "INVALID_TENANT",
                    "Inquilino vinculado não encontrado.",
                ));
            }
        }

        let ai_json = match input.ai_json {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(raw),
            Some(other) => Some(other.to_string()),
        };

        let new = NewInspection {
            endereco: owned(&input.endereco).unwrap_or_default(),
            tipo: owned(&input.tipo).unwrap_or_default(),
            status: owned(&input.status).unwrap_or_else(|| STATUS_PENDING.to_string()),
            data: input
                .data
                .as_deref()
                .and_then(parse_flexible_date)
                .unwrap_or_else(Utc::now),
            created_from_ai: input.created_from_ai.unwrap_or(false),
            ai_summary: owned(&input.ai_summary),
            ai_json,
            contract_id,
            tenant_record_id: tenant_id,
        };
        let created = self.repos.inspections().create_metered(user_id, new).await?;
        info!(user_id, inspection_id = created.id, "Inspection created");
        Ok(created)
    }

    pub async fn update_status(&self, user_id: i32, id: i32, status: Option<&str>) -> DomainResult<Inspection> {
        let status = non_blank(status)
            .ok_or_else(|| DomainError::invalid("INVALID_STATUS", "Status é obrigatório."))?;
        self.repos
            .inspections()
            .update_status(user_id, id, status)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn add_addendum(&self, user_id: i32, id: i32, text: Option<&str>) -> DomainResult<Inspection> {
        let text = non_blank(text)
            .ok_or_else(|| DomainError::invalid("INVALID_TEXT", "Texto do aditivo é obrigatório."))?;
        self.append(user_id, id, "aditivos", addendum_entry(text, Utc::now())).await
    }

    pub async fn add_manual_note(&self, user_id: i32, id: i32, text: Option<&str>) -> DomainResult<Inspection> {
        let text = non_blank(text)
            .ok_or_else(|| DomainError::invalid("INVALID_TEXT", "Texto da observação é obrigatório."))?;
        self.append(user_id, id, "manualNotes", manual_note_entry(text, Utc::now())).await
    }

    async fn append(&self, user_id: i32, id: i32, key: &str, entry: Value) -> DomainResult<Inspection> {
        let current = self.get(user_id, id).await?;
        let doc = append_report_entry(current.ai_json.as_deref(), key, entry);
        self.repos
            .inspections()
            .update_ai_json(user_id, id, doc)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Sends every photo in one vision request and normalizes the reply.
    /// Nothing is persisted; the client saves the result through `create`.
    pub async fn analyze(&self, request: AnalyzeRequest) -> DomainResult<InspectionAnalysis> {
        let missing = missing_fields(&[
            ("endereco", request.endereco.as_deref()),
            ("tipo", request.tipo.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(DomainError::MissingFields {
                message: "Campos obrigatórios: endereco, tipo.".into(),
                fields: missing,
            });
        }
        if request.files.is_empty() {
            return Err(DomainError::invalid(
                "VALIDATION_ERROR",
                "Envie ao menos uma imagem em \"files\".",
            ));
        }
        if request.files.len() > MAX_ANALYZE_FILES {
            return Err(DomainError::invalid(
                "VALIDATION_ERROR",
                format!("Envie no máximo {MAX_ANALYZE_FILES} imagens."),
            ));
        }
        if request.files.iter().any(|f| f.bytes.len() > MAX_ANALYZE_FILE_BYTES) {
            return Err(DomainError::invalid(
                "FILE_TOO_LARGE",
                "Cada imagem deve ter no máximo 5 MB.",
            ));
        }

        let endereco = owned(&request.endereco).unwrap_or_default();
        let tipo = owned(&request.tipo).unwrap_or_default();
        let images: Vec<InspectionImage> = request
            .files
            .iter()
            .enumerate()
            .map(|(idx, file)| {
                let foto_id = owned(&file.original_name).unwrap_or_else(|| format!("foto-{}", idx + 1));
                InspectionImage::new(
                    foto_id,
                    file.mime_type.clone(),
                    &file.bytes,
                    request.ambientes.get(idx).cloned().unwrap_or_default(),
                    request.notas.get(idx).cloned().unwrap_or_default(),
                )
            })
            .collect();
        info!(endereco = %endereco, tipo = %tipo, images = images.len(), "Analyzing inspection photos");

        let mut parts = vec![AiPart::Text(vision_prompt(
            &endereco,
            &tipo,
            non_blank(request.observacoes.as_deref()),
            &request.metadata,
        ))];
        parts.extend(photo_parts(&images));

        let reply = self.ai.generate(AiTask::Inspection, parts).await.map_err(|err| match err {
            AiError::MissingKey => DomainError::NotConfigured {
                code: "MISSING_GOOGLE_KEY",
                message: "Configure a GOOGLE_API_KEY antes de usar a análise por IA.".into(),
            },
            other => {
                warn!(error = %other, "Inspection analysis failed");
                analyze_failed(other.to_string())
            }
        })?;

        let parsed = extract_json_object(&reply.text).map_err(|err| {
            warn!(error = %err, "Vision reply is not JSON");
            analyze_failed("AI_JSON_PARSE_ERROR")
        })?;
        normalize_vision_report(parsed, &images, &endereco, &request.metadata, &reply.model, Utc::now())
            .ok_or_else(|| analyze_failed("AI_INVALID_SHAPE"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::testing::{repos, user, FakeAi};
    use crate::domain::billing::{PlanType, QuotaKind};
    use crate::domain::inspection::parse_report;

    fn input(endereco: &str) -> InspectionInput {
        InspectionInput {
            endereco: Some(endereco.into()),
            tipo: Some("entrada".into()),
            ..Default::default()
        }
    }

    fn photo(name: Option<&str>) -> UploadedImage {
        UploadedImage {
            original_name: name.map(str::to_string),
            mime_type: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    #[tokio::test]
    async fn create_defaults_and_links_are_checked() {
        let (db, repos) = repos().await;
        let uid = user(&db, "vist@imobi.test", PlanType::Starter).await;
        let service = InspectionService::new(repos, Arc::new(FakeAi::new(vec![])));

        let mut with_json = input("Rua G, 1");
        with_json.ai_json = Some(serde_json::json!({"resumoGeral": "ok"}));
        let created = service.create(uid, with_json).await.unwrap();
        assert_eq!(created.status, "pendente");
        assert!(!created.created_from_ai);
        assert_eq!(parse_report(created.ai_json.as_deref()).unwrap()["resumoGeral"], "ok");

        let mut bad_contract = input("Rua G, 2");
        bad_contract.contract_id = Some("nope".into());
        assert!(matches!(
            service.create(uid, bad_contract).await,
            Err(DomainError::Invalid { code: "INVALID_CONTRACT", .. })
        ));

        let mut bad_tenant = input("Rua G, 3");
        bad_tenant.tenant_id = Some("nope".into());
        assert!(matches!(
            service.create(uid, bad_tenant).await,
            Err(DomainError::Invalid { code: "INVALID_TENANT", .. })
        ));

        assert!(matches!(
            service.create(uid, InspectionInput::default()).await,
            Err(DomainError::MissingFields { ref fields, .. }) if fields.len() == 2
        ));
    }

    #[tokio::test]
    async fn starter_plan_allows_five_inspections() {
        let (db, repos) = repos().await;
        let uid = user(&db, "lim@imobi.test", PlanType::Starter).await;
        let service = InspectionService::new(repos, Arc::new(FakeAi::new(vec![])));

        for i in 0..5 {
            service.create(uid, input(&format!("Rua {i}"))).await.unwrap();
        }
        let err = service.create(uid, input("Rua 6")).await.unwrap_err();
        assert!(matches!(err, DomainError::PlanLimit(ref e) if e.kind == QuotaKind::Inspection));
        assert_eq!(service.list(uid, Some("todos"), None, None).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn status_addendum_and_notes() {
        let (db, repos) = repos().await;
        let uid = user(&db, "adit@imobi.test", PlanType::Pro).await;
        let service = InspectionService::new(repos, Arc::new(FakeAi::new(vec![])));
        let created = service.create(uid, input("Rua H, 9")).await.unwrap();

        assert!(matches!(
            service.update_status(uid, created.id, Some(" ")).await,
            Err(DomainError::Invalid { code: "INVALID_STATUS", .. })
        ));
        let done = service.update_status(uid, created.id, Some("concluida")).await.unwrap();
        assert_eq!(done.status, "concluida");

        service.add_addendum(uid, created.id, Some("Troca do chuveiro")).await.unwrap();
        service.add_addendum(uid, created.id, Some("Pintura refeita")).await.unwrap();
        let noted = service.add_manual_note(uid, created.id, Some("Chaves entregues")).await.unwrap();

        let report = parse_report(noted.ai_json.as_deref()).unwrap();
        assert_eq!(report["aditivos"].as_array().unwrap().len(), 2);
        assert_eq!(report["aditivos"][1]["texto"], "Pintura refeita");
        assert_eq!(report["manualNotes"][0]["text"], "Chaves entregues");

        assert!(matches!(
            service.add_addendum(uid, created.id + 50, Some("x")).await,
            Err(DomainError::NotFound { entity: "Inspection", .. })
        ));
    }

    #[tokio::test]
    async fn analyze_builds_one_vision_request() {
        let (_db, repos) = repos().await;
        let reply = r#"Segue o laudo: {"resumoGeral": "Imóvel em bom estado.", "fotos": [{"fotoId": "sala.jpg", "resumoCurto": "Sala"}]} fim"#;
        let ai = Arc::new(FakeAi::replying(reply));
        let service = InspectionService::new(repos, ai.clone());

        let analysis = service
            .analyze(AnalyzeRequest {
                endereco: Some("Rua I, 3".into()),
                tipo: Some("saida".into()),
                ambientes: vec!["Sala".into()],
                files: vec![photo(Some("sala.jpg")), photo(None)],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(analysis.laudo_geral, "Imóvel em bom estado.");
        assert_eq!(analysis.fotos[0].foto_id, "sala.jpg");
        assert_eq!(analysis.fotos[0].severidade, "sem_danos");
        assert_eq!(analysis.header["enderecoImovel"], "Rua I, 3");

        let calls = ai.calls.lock().unwrap();
        let (task, parts) = &calls[0];
        assert_eq!(*task, AiTask::Inspection);
        assert_eq!(parts.len(), 5);
        drop(calls);
        let prompt = ai.prompt_text(0);
        assert!(prompt.contains("Foto sala.jpg | ambiente: Sala | nota: sem nota"));
        assert!(prompt.contains("Foto foto-2 | ambiente: não informado"));
    }

    #[tokio::test]
    async fn analyze_maps_ai_failures() {
        let (_db, repos) = repos().await;
        let request = AnalyzeRequest {
            endereco: Some("Rua J".into()),
            tipo: Some("entrada".into()),
            files: vec![photo(None)],
            ..Default::default()
        };

        let no_key = InspectionService::new(repos.clone(), Arc::new(FakeAi::without_key()));
        assert!(matches!(
            no_key.analyze(request.clone()).await,
            Err(DomainError::NotConfigured { code: "MISSING_GOOGLE_KEY", .. })
        ));

        let prose = InspectionService::new(repos.clone(), Arc::new(FakeAi::replying("sem json")));
        assert!(matches!(
            prose.analyze(request.clone()).await,
            Err(DomainError::Failed { code: "AI_ANALYZE_ERROR", .. })
        ));

        let empty = InspectionService::new(repos, Arc::new(FakeAi::new(vec![])));
        let mut no_files = request;
        no_files.files.clear();
        assert!(matches!(
            empty.analyze(no_files).await,
            Err(DomainError::Invalid { code: "VALIDATION_ERROR", .. })
        ));
    }
}
