use chrono::{DateTime, Utc};

pub const ALLOWED_MIME_TYPES: [&str; 8] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "text/plain",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const DISALLOWED_TYPE_MESSAGE: &str =
    "Tipo de arquivo não permitido. Envie PDF, imagens (jpg, png, webp, heic) ou textos/docx.";

/// How an attachment is turned into prompt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Text,
    Word,
    Image,
}

impl AttachmentKind {
    /// `None` for MIME types the mentor does not accept.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::Text),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Word)
            }
            m if ALLOWED_MIME_TYPES.contains(&m) => Some(Self::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MentorAttachment {
    pub id: i32,
    pub user_id: i32,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub checksum: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMentorAttachment {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub checksum: Option<String>,
}

/// `{base}_{user}_{millis}_{nonce}{ext}` with whitespace in the base
/// collapsed to underscores.
pub fn stored_filename(original_name: &str, user_id: i32, millis: i64, nonce: u32) -> String {
    let (base, ext) = match original_name.rfind('.') {
        Some(dot) if dot > 0 => original_name.split_at(dot),
        _ => (original_name, ""),
    };
    let base = base.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{base}_{user_id}_{millis}_{nonce}{ext}")
}

/// Content read from an attachment before it is described to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    Text(String),
    Unreadable,
    NotExtracted,
}

pub fn summarize_attachment(
    kind: AttachmentKind,
    original_name: &str,
    mime: &str,
    size: usize,
    content: &ExtractedContent,
) -> String {
    match (kind, content) {
        (AttachmentKind::Pdf, ExtractedContent::Text(text)) if !text.trim().is_empty() => {
            format!("Conteúdo extraído do PDF \"{original_name}\":\n{}", text.trim())
        }
        (AttachmentKind::Pdf, ExtractedContent::Unreadable) => {
            format!("PDF \"{original_name}\" não pôde ser lido. Considere reenviar.")
        }
        (AttachmentKind::Pdf, _) => format!("PDF \"{original_name}\" sem texto extraível."),
        (AttachmentKind::Text, ExtractedContent::Text(text)) => {
            format!("Conteúdo do arquivo texto \"{original_name}\":\n{text}")
        }
        (AttachmentKind::Text, _) => format!("Arquivo texto \"{original_name}\" não pôde ser lido."),
        (AttachmentKind::Word, _) => {
            format!("Arquivo Word recebido: {original_name} (tipo {mime}, {size} bytes).")
        }
        (AttachmentKind::Image, _) => {
            format!("Imagem enviada: {original_name} (tipo {mime}, tamanho {size} bytes).")
        }
    }
}

pub fn build_mentor_prompt(question: &str, summaries: &[String]) -> String {
    let attachments = if summaries.is_empty() {
        String::new()
    } else {
        format!(
            "Se aplicável, use também o conteúdo abaixo extraído dos arquivos em anexo:\n{}",
            summaries.join("\n\n")
        )
    };
    format!(
        "Você é o Mentor Jurídico do ImobiContract. Responda em português claro, com parágrafos bem espaçados e markdown limpo (sem mostrar os asteriscos).\n\nPergunta do usuário:\n{question}\n\n{attachments}"
    )
    .trim()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_mime_types() {
        assert_eq!(AttachmentKind::from_mime("application/pdf"), Some(AttachmentKind::Pdf));
        assert_eq!(AttachmentKind::from_mime("image/heic"), Some(AttachmentKind::Image));
        assert_eq!(
            AttachmentKind::from_mime("application/msword"),
            Some(AttachmentKind::Word)
        );
        assert_eq!(AttachmentKind::from_mime("application/zip"), None);
    }

    #[test]
    fn stored_filename_keeps_extension() {
        assert_eq!(
            stored_filename("Contrato final v2.pdf", 7, 1700000000000, 42),
            "Contrato_final_v2_7_1700000000000_42.pdf"
        );
        assert_eq!(stored_filename("notas", 1, 5, 9), "notas_1_5_9");
    }

    #[test]
    fn pdf_summaries_cover_each_outcome() {
        let text = ExtractedContent::Text("  Cláusula 1  ".into());
        assert_eq!(
            summarize_attachment(AttachmentKind::Pdf, "a.pdf", "application/pdf", 10, &text),
            "Conteúdo extraído do PDF \"a.pdf\":\nCláusula 1"
        );
        assert_eq!(
            summarize_attachment(AttachmentKind::Pdf, "a.pdf", "application/pdf", 10, &ExtractedContent::Text(" ".into())),
            "PDF \"a.pdf\" sem texto extraível."
        );
        assert!(summarize_attachment(
            AttachmentKind::Pdf,
            "a.pdf",
            "application/pdf",
            10,
            &ExtractedContent::Unreadable
        )
        .contains("não pôde ser lido"));
    }

    #[test]
    fn prompt_without_attachments_ends_at_question() {
        let prompt = build_mentor_prompt("O que é fiança?", &[]);
        assert!(prompt.ends_with("Pergunta do usuário:\nO que é fiança?"));
    }

    #[test]
    fn prompt_joins_attachment_summaries() {
        let prompt = build_mentor_prompt("Q", &["A".into(), "B".into()]);
        assert!(prompt.ends_with("arquivos em anexo:\nA\n\nB"));
    }
}
