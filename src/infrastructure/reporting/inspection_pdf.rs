//! A4 inspection report (laudo) rendered with `printpdf`
//!
//! Layout is a single text column with a moving cursor; a new page starts
//! whenever the next line or photo would cross the bottom margin. Text is
//! wrapped by character count since builtin fonts expose no metrics.

use base64::Engine;
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::domain::inspection::{parse_report, Inspection};
use crate::shared::errors::InfraError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const PHOTO_MAX_WIDTH: f32 = 170.0;
const PHOTO_MAX_HEIGHT: f32 = 90.0;
const IMAGE_DPI: f32 = 150.0;
const NOT_INFORMED: &str = "não informado";

#[derive(Clone, Copy)]
enum Style {
    Regular,
    Bold,
    Italic,
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

fn pdf_err(e: impl std::fmt::Display) -> InfraError {
    InfraError::Pdf(e.to_string())
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, InfraError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            y: PAGE_HEIGHT - MARGIN,
            regular,
            bold,
            italic,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn text(&mut self, text: &str, size: f32, style: Style) {
        let line_height = size * 0.45;
        for line in wrap(text, max_chars(size)) {
            self.ensure(line_height);
            self.y -= line_height;
            let font = match style {
                Style::Regular => &self.regular,
                Style::Bold => &self.bold,
                Style::Italic => &self.italic,
            };
            self.layer.use_text(line, size, Mm(MARGIN), Mm(self.y), font);
        }
    }

    /// Scales the image to fit the photo box, keeping its aspect ratio.
    fn image(&mut self, img: DynamicImage) {
        let (width_px, height_px) = img.dimensions();
        if width_px == 0 || height_px == 0 {
            return;
        }
        let natural_w = width_px as f32 / IMAGE_DPI * 25.4;
        let natural_h = height_px as f32 / IMAGE_DPI * 25.4;
        let scale = (PHOTO_MAX_WIDTH / natural_w).min(PHOTO_MAX_HEIGHT / natural_h);
        let drawn_h = natural_h * scale;

        self.ensure(drawn_h);
        self.y -= drawn_h;
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(self.y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
    }

    fn finish(self) -> Result<Vec<u8>, InfraError> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

/// Roughly how many Helvetica characters fit the text column at `size`.
fn max_chars(size: f32) -> usize {
    let column = PAGE_WIDTH - 2.0 * MARGIN;
    ((column / (size * 0.19)) as usize).max(20)
}

/// Greedy word wrap; words longer than a line are split.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
            if needed > max && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Decodes a JPEG or PNG data URL. Other formats are skipped.
fn decode_data_url(url: &str) -> Option<DynamicImage> {
    let (meta, payload) = url.strip_prefix("data:")?.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    if mime != "image/jpeg" && mime != "image/png" {
        warn!(mime, "Photo format not embeddable in report");
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload).ok()?;
    image_crate::load_from_memory(&bytes).ok()
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn list_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Header stored with the report, or one derived from the inspection row.
fn header_for(report: &Value, inspection: &Inspection) -> Value {
    match report.get("header") {
        Some(h) if h.is_object() => h.clone(),
        _ => json!({
            "tipoVistoria": str_field(report, "tipoVistoria").unwrap_or("VISTORIA_AVULSA"),
            "data": inspection.data.to_rfc3339(),
            "cidadeUf": "não informada",
            "enderecoImovel": inspection.endereco,
            "locadores": [NOT_INFORMED],
            "locatarios": [NOT_INFORMED],
            "objetoVistoria": inspection.endereco,
        }),
    }
}

/// `Laudo-Vistoria-{endereco}.pdf` with whitespace runs turned into `-`.
pub fn report_filename(endereco: &str) -> String {
    format!(
        "Laudo-Vistoria-{}.pdf",
        endereco.split_whitespace().collect::<Vec<_>>().join("-")
    )
}

pub fn render_inspection_report(inspection: &Inspection) -> Result<Vec<u8>, InfraError> {
    let report = match parse_report(inspection.ai_json.as_deref()) {
        Some(v) if v.is_object() => v,
        _ => json!({}),
    };
    let header = header_for(&report, inspection);
    let resumo = str_field(&report, "resumoGeral")
        .map(str::to_string)
        .or_else(|| inspection.ai_summary.clone().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "Resumo não disponível.".to_string());
    let empty = Vec::new();
    let ambientes = report.get("ambientes").and_then(Value::as_array).unwrap_or(&empty);
    let fotos = ["fotos", "foto", "photos"]
        .iter()
        .find_map(|k| report.get(*k).and_then(Value::as_array))
        .unwrap_or(&empty);

    let mut w = PageWriter::new("Laudo de Vistoria")?;
    w.text("Laudo de Vistoria", 20.0, Style::Bold);
    w.gap(3.0);

    let header_lines = [
        format!(
            "Endereço: {}",
            str_field(&header, "enderecoImovel").unwrap_or(&inspection.endereco)
        ),
        format!("Tipo de vistoria: {}", str_field(&header, "tipoVistoria").unwrap_or("")),
        format!("Data: {}", str_field(&header, "data").unwrap_or("")),
        format!("Cidade/UF: {}", str_field(&header, "cidadeUf").unwrap_or("")),
        format!("Locador(es): {}", list_field(&header, "locadores")),
        format!("Locatário(s): {}", list_field(&header, "locatarios")),
        format!("Objeto da vistoria: {}", str_field(&header, "objetoVistoria").unwrap_or("")),
    ];
    for line in &header_lines {
        w.text(line, 12.0, Style::Regular);
    }
    w.gap(5.0);

    w.text("Resumo geral", 15.0, Style::Bold);
    w.gap(1.5);
    w.text(&resumo, 12.0, Style::Regular);
    w.gap(5.0);

    if !ambientes.is_empty() {
        w.text("Ambientes analisados", 15.0, Style::Bold);
        w.gap(2.0);
        for ambiente in ambientes {
            w.text(str_field(ambiente, "ambiente").unwrap_or("Ambiente"), 13.0, Style::Bold);
            if let Some(resumo) = str_field(ambiente, "resumoAmbiente") {
                w.text(resumo, 11.0, Style::Regular);
            }
            w.gap(1.0);
            for item in ambiente.get("itens").and_then(Value::as_array).unwrap_or(&empty) {
                w.text(
                    &format!(
                        "- {}: {}",
                        str_field(item, "item").unwrap_or("Item"),
                        str_field(item, "estadoGeral").unwrap_or("")
                    ),
                    11.0,
                    Style::Regular,
                );
                for (label, key) in [
                    ("Problema", "descricaoDanos"),
                    ("Possíveis causas", "possiveisCausas"),
                    ("Riscos", "riscosSeNaoTratar"),
                    ("Ação recomendada", "acaoRecomendada"),
                ] {
                    if let Some(value) = str_field(item, key) {
                        w.text(&format!("  {label}: {value}"), 11.0, Style::Regular);
                    }
                }
                w.gap(1.0);
            }
            w.gap(3.0);
        }
    }

    if !fotos.is_empty() {
        w.new_page();
        w.text("Fotos da vistoria", 16.0, Style::Bold);
        w.gap(4.0);

        for (idx, foto) in fotos.iter().enumerate() {
            w.ensure(PHOTO_MAX_HEIGHT + 30.0);
            w.text(
                &format!(
                    "Foto {} - Ambiente: {}",
                    idx + 1,
                    str_field(foto, "ambiente").unwrap_or("Não informado")
                ),
                14.0,
                Style::Bold,
            );
            w.gap(2.0);

            let descricao = str_field(foto, "resumoCurto")
                .or_else(|| str_field(foto, "descricaoDanos"))
                .unwrap_or("-");
            w.text(&format!("Descrição: {descricao}"), 11.0, Style::Regular);
            for (label, key) in [
                ("Severidade", "severidade"),
                ("Risco", "riscosSeNaoTratar"),
                ("Ação recomendada", "acaoRecomendada"),
            ] {
                if let Some(value) = str_field(foto, key) {
                    w.text(&format!("{label}: {value}"), 11.0, Style::Regular);
                }
            }
            w.gap(3.0);

            let image = ["fileUrl", "previewDataUrl", "file_url"]
                .iter()
                .filter_map(|k| str_field(foto, k))
                .find_map(decode_data_url);
            match image {
                Some(img) => w.image(img),
                None => w.text("(Prévia da foto indisponível)", 11.0, Style::Italic),
            }
            w.gap(8.0);
        }
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn inspection(ai_json: Option<String>) -> Inspection {
        Inspection {
            id: 1,
            user_id: 1,
            endereco: "Rua das Flores 10".into(),
            tipo: "entrada".into(),
            status: "pendente".into(),
            data: Utc::now(),
            created_from_ai: true,
            ai_summary: Some("Imóvel em bom estado".into()),
            ai_json,
            contract_id: None,
            tenant_record_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn png_data_url() -> String {
        let img = image_crate::RgbImage::from_pixel(4, 3, image_crate::Rgb([200, 10, 10]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, image_crate::ImageFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    #[test]
    fn filename_replaces_whitespace() {
        assert_eq!(report_filename("Rua  das Flores, 10"), "Laudo-Vistoria-Rua-das-Flores,-10.pdf");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("um dois tres quatro cinco", 9);
        assert_eq!(lines, vec!["um dois", "tres", "quatro", "cinco"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn only_jpeg_and_png_are_decoded() {
        assert!(decode_data_url(&png_data_url()).is_some());
        assert!(decode_data_url("data:image/webp;base64,AAAA").is_none());
        assert!(decode_data_url("https://example.com/a.png").is_none());
    }

    #[test]
    fn renders_without_report() {
        let bytes = render_inspection_report(&inspection(None)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_rooms_and_photos() {
        let report = json!({
            "resumoGeral": "Pequenos reparos",
            "ambientes": [{
                "ambiente": "Sala",
                "itens": [{ "item": "Parede", "estadoGeral": "regular", "descricaoDanos": "Fissura" }]
            }],
            "fotos": [
                { "ambiente": "Sala", "resumoCurto": "Fissura na parede", "fileUrl": png_data_url() },
                { "ambiente": "Cozinha", "severidade": "leve" }
            ]
        });
        let bytes = render_inspection_report(&inspection(Some(report.to_string()))).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
