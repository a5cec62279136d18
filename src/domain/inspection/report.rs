//! Inspection report (laudo) documents
//!
//! The report is an open JSON document: the vision model decides most of its
//! shape, and users append addenda and manual notes to it afterwards. Only
//! the few fields the backend relies on are typed here.

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

const PHOTOS: &str = "fotos";
const NOT_INFORMED: &str = "não informado";

/// Reads a stored report. Text that is not valid JSON is kept as a string.
pub fn parse_report(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    let mut value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    mirror_photo_urls(&mut value);
    Some(value)
}

/// Older reports carry only one of `fileUrl` / `previewDataUrl` per photo.
fn mirror_photo_urls(report: &mut Value) {
    let Some(photos) = report.get_mut(PHOTOS).and_then(Value::as_array_mut) else {
        return;
    };
    for photo in photos.iter_mut().filter_map(Value::as_object_mut) {
        let file_url = text(photo.get("fileUrl"));
        let preview = text(photo.get("previewDataUrl"));
        if let Some(url) = file_url.clone().or_else(|| preview.clone()) {
            photo.insert("fileUrl".into(), Value::String(url));
        }
        if let Some(url) = preview.or(file_url) {
            photo.insert("previewDataUrl".into(), Value::String(url));
        }
    }
}

/// Appends `entry` to the array under `key`, creating both the document and
/// the array when needed. Returns the serialized document.
pub fn append_report_entry(raw: Option<&str>, key: &str, entry: Value) -> String {
    let mut doc = raw
        .and_then(|r| serde_json::from_str::<Value>(r).ok())
        .and_then(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();

    match doc.get_mut(key).and_then(Value::as_array_mut) {
        Some(items) => items.push(entry),
        None => {
            doc.insert(key.to_string(), Value::Array(vec![entry]));
        }
    }
    Value::Object(doc).to_string()
}

pub fn addendum_entry(texto: &str, now: DateTime<Utc>) -> Value {
    json!({
        "id": now.timestamp_millis().to_string(),
        "dataIso": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        "texto": texto,
    })
}

pub fn manual_note_entry(text: &str, now: DateTime<Utc>) -> Value {
    json!({
        "id": now.timestamp_millis().to_string(),
        "createdAt": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        "text": text,
    })
}

// ── Vision analysis ─────────────────────────────────────────────

/// One uploaded photo sent to the vision model.
#[derive(Debug, Clone)]
pub struct InspectionImage {
    pub foto_id: String,
    pub mime_type: String,
    pub base64: String,
    pub ambiente: String,
    pub nota: String,
}

impl InspectionImage {
    pub fn new(foto_id: String, mime_type: String, bytes: &[u8], ambiente: String, nota: String) -> Self {
        Self {
            foto_id,
            mime_type,
            base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            ambiente,
            nota,
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Optional context the user supplies alongside the photos.
#[derive(Debug, Clone, Default)]
pub struct AnalysisMetadata {
    pub locadores: Option<Vec<String>>,
    pub locatarios: Option<Vec<String>>,
    pub cidade_uf: Option<String>,
    pub tipo_vistoria: Option<String>,
    pub objeto_vistoria: Option<String>,
}

impl AnalysisMetadata {
    pub fn locadores_or_default(&self) -> Vec<String> {
        self.locadores.clone().unwrap_or_else(|| vec![NOT_INFORMED.to_string()])
    }

    pub fn locatarios_or_default(&self) -> Vec<String> {
        self.locatarios.clone().unwrap_or_else(|| vec![NOT_INFORMED.to_string()])
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedPhoto {
    pub foto_id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub ambiente: String,
    pub item_relacionado: Option<String>,
    pub resumo_curto: String,
    pub descricao_danos: Option<String>,
    pub possiveis_causas: Option<String>,
    pub riscos_se_nao_tratar: Option<String>,
    pub acao_recomendada: Option<String>,
    pub severidade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_data_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InspectionAnalysis {
    pub source: String,
    pub laudo_geral: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumo_geral: Option<String>,
    #[schema(value_type = Object)]
    pub header: Value,
    #[schema(value_type = Vec<Object>)]
    pub ambientes: Vec<Value>,
    pub fotos: Vec<AnalyzedPhoto>,
    pub debug_reason: String,
}

/// Slice between the first `{` and the last `}`; models like to wrap JSON
/// in prose or code fences.
pub fn extract_json_object(text: &str) -> Result<Value, serde_json::Error> {
    let slice = match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if last > first => &text[first..=last],
        _ => text,
    };
    serde_json::from_str(slice)
}

/// Turns the model reply into the response shape the client renders.
/// Returns `None` when the reply is not a JSON object.
pub fn normalize_vision_report(
    parsed: Value,
    images: &[InspectionImage],
    endereco: &str,
    metadata: &AnalysisMetadata,
    model_used: &str,
    now: DateTime<Utc>,
) -> Option<InspectionAnalysis> {
    let Value::Object(report) = parsed else {
        return None;
    };

    let by_id: HashMap<&str, &InspectionImage> =
        images.iter().map(|img| (img.foto_id.as_str(), img)).collect();

    let raw_photos = report
        .get(PHOTOS)
        .or_else(|| report.get("photos"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let fotos = raw_photos
        .iter()
        .enumerate()
        .map(|(idx, foto)| normalize_photo(foto, idx, &by_id, images))
        .collect();

    let header = match report.get("header") {
        Some(h) if !h.is_null() => h.clone(),
        _ => json!({
            "tipoVistoria": metadata.tipo_vistoria.clone().unwrap_or_else(|| "VISTORIA_AVULSA".into()),
            "data": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            "cidadeUf": metadata.cidade_uf.clone().unwrap_or_else(|| "não informada".into()),
            "enderecoImovel": endereco,
            "locadores": metadata.locadores_or_default(),
            "locatarios": metadata.locatarios_or_default(),
            "objetoVistoria": metadata.objeto_vistoria.clone().unwrap_or_else(|| endereco.to_string()),
        }),
    };

    let ambientes = report
        .get("ambientes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let resumo = text(report.get("resumoGeral"));
    let laudo = text(report.get("laudoGeral"));
    let laudo_text = resumo
        .clone()
        .or_else(|| laudo.clone())
        .or_else(|| text(report.get("header").and_then(|h| h.get("resumo"))))
        .or_else(|| text(ambientes.first().and_then(|a| a.get("resumoAmbiente"))));

    Some(InspectionAnalysis {
        source: "gemini".into(),
        laudo_geral: laudo_text
            .clone()
            .unwrap_or_else(|| "Análise automática da vistoria.".into()),
        resumo_geral: resumo.or(laudo).or(laudo_text),
        header,
        ambientes,
        fotos,
        debug_reason: format!("model={model_used}"),
    })
}

fn normalize_photo(
    foto: &Value,
    idx: usize,
    by_id: &HashMap<&str, &InspectionImage>,
    images: &[InspectionImage],
) -> AnalyzedPhoto {
    let empty = Map::new();
    let foto = foto.as_object().unwrap_or(&empty);
    let field = |key: &str| text(foto.get(key));

    let original = field("fotoId")
        .and_then(|id| by_id.get(id.as_str()).copied())
        .or_else(|| images.get(idx));
    let positional = format!("foto-{}", idx + 1);

    let preview = field("previewDataUrl").or_else(|| original.map(InspectionImage::data_url));
    let danos = foto.get("danos").and_then(Value::as_array);
    let main_damage = danos
        .and_then(|d| d.first())
        .or_else(|| foto.get("principalDano").filter(|v| !v.is_null()));

    AnalyzedPhoto {
        foto_id: field("fotoId")
            .or_else(|| original.map(|o| o.foto_id.clone()))
            .unwrap_or_else(|| positional.clone()),
        file_name: original.map(|o| o.foto_id.clone()).unwrap_or(positional),
        file_url: field("fileUrl").or_else(|| preview.clone()),
        ambiente: field("ambiente")
            .or_else(|| original.map(|o| o.ambiente.clone()).filter(|a| !a.is_empty()))
            .unwrap_or_else(|| "Ambiente".into()),
        item_relacionado: field("itemRelacionado"),
        resumo_curto: field("resumoCurto")
            .or_else(|| field("descricaoAmbiente"))
            .or_else(|| field("descricao"))
            .unwrap_or_else(|| "Ambiente sem descrição detalhada.".into()),
        descricao_danos: field("descricaoDanos")
            .or_else(|| text(main_damage.and_then(|d| d.get("descricao")))),
        possiveis_causas: field("possiveisCausas"),
        riscos_se_nao_tratar: field("riscosSeNaoTratar"),
        acao_recomendada: field("acaoRecomendada")
            .or_else(|| text(main_damage.and_then(|d| d.get("acaoRecomendada")))),
        severidade: field("severidade")
            .or_else(|| text(danos.and_then(|d| d.first()).and_then(|d| d.get("severidade"))))
            .unwrap_or_else(|| "sem_danos".into()),
        preview_data_url: preview,
    }
}

/// Non-empty string value.
fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(id: &str) -> InspectionImage {
        InspectionImage::new(id.into(), "image/png".into(), b"png", "Sala".into(), String::new())
    }

    #[test]
    fn parse_keeps_invalid_json_as_text() {
        assert_eq!(parse_report(Some("not json")), Some(Value::String("not json".into())));
        assert_eq!(parse_report(None), None);
    }

    #[test]
    fn parse_mirrors_photo_urls() {
        let raw = r#"{"fotos":[{"previewDataUrl":"data:x"},{"fileUrl":"/f.png"},{}]}"#;
        let report = parse_report(Some(raw)).unwrap();
        let fotos = report["fotos"].as_array().unwrap();
        assert_eq!(fotos[0]["fileUrl"], "data:x");
        assert_eq!(fotos[1]["previewDataUrl"], "/f.png");
        assert!(fotos[2].get("fileUrl").is_none());
    }

    #[test]
    fn append_creates_array_and_keeps_existing_fields() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let first = append_report_entry(Some(r#"{"resumoGeral":"ok"}"#), "aditivos", addendum_entry("um", now));
        let second = append_report_entry(Some(&first), "aditivos", addendum_entry("dois", now));
        let doc: Value = serde_json::from_str(&second).unwrap();
        assert_eq!(doc["resumoGeral"], "ok");
        assert_eq!(doc["aditivos"].as_array().unwrap().len(), 2);
        assert_eq!(doc["aditivos"][1]["texto"], "dois");
        assert_eq!(doc["aditivos"][0]["dataIso"], "2025-03-01T12:00:00.000Z");
    }

    #[test]
    fn append_replaces_unreadable_document() {
        let now = Utc::now();
        let out = append_report_entry(Some("garbage"), "manualNotes", manual_note_entry("nota", now));
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["manualNotes"][0]["text"], "nota");
    }

    #[test]
    fn extract_json_ignores_surrounding_prose() {
        let value = extract_json_object("Segue:\n```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
        assert!(extract_json_object("sem json").is_err());
    }

    #[test]
    fn normalize_fills_photo_defaults_from_uploads() {
        let parsed = json!({
            "resumoGeral": "Imóvel em bom estado.",
            "fotos": [
                {"fotoId": "b.png", "resumoCurto": "Parede"},
                {"danos": [{"severidade": "grave", "descricao": "Infiltração"}]}
            ]
        });
        let images = vec![image("a.png"), image("b.png")];
        let now = Utc::now();
        let out = normalize_vision_report(parsed, &images, "Rua A", &AnalysisMetadata::default(), "m1", now)
            .unwrap();

        assert_eq!(out.laudo_geral, "Imóvel em bom estado.");
        assert_eq!(out.debug_reason, "model=m1");
        assert_eq!(out.fotos[0].file_name, "b.png");
        assert_eq!(out.fotos[0].severidade, "sem_danos");
        assert_eq!(out.fotos[0].ambiente, "Sala");
        assert_eq!(out.fotos[1].foto_id, "b.png");
        assert_eq!(out.fotos[1].severidade, "grave");
        assert_eq!(out.fotos[1].descricao_danos.as_deref(), Some("Infiltração"));
        assert!(out.fotos[1].preview_data_url.as_deref().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(out.header["enderecoImovel"], "Rua A");
        assert_eq!(out.header["locadores"][0], "não informado");
    }

    #[test]
    fn normalize_rejects_non_objects() {
        let out = normalize_vision_report(json!([1, 2]), &[], "Rua", &AnalysisMetadata::default(), "m", Utc::now());
        assert!(out.is_none());
    }
}
