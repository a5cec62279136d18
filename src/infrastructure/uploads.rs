//! Local upload storage
//!
//! Files are written under `{root}/{area}/{stored_name}` and fingerprinted
//! with a SHA-256 hex digest.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::mentor::{AttachmentKind, ExtractedContent};
use crate::shared::errors::InfraError;

pub const MENTOR_AREA: &str = "mentor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size_bytes: i64,
    pub checksum: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(&self, area: &str, stored_name: &str, bytes: &[u8]) -> Result<StoredFile, InfraError> {
        let dir = self.root.join(area);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(stored_name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Upload stored");

        Ok(StoredFile {
            path,
            size_bytes: bytes.len() as i64,
            checksum: sha256_hex(bytes),
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Text available from an attachment. PDFs go through `pdf-extract` on the
/// blocking pool, plain text is decoded lossily; other kinds are described,
/// not read.
pub async fn extract_content(kind: AttachmentKind, bytes: &[u8]) -> ExtractedContent {
    match kind {
        AttachmentKind::Pdf => {
            let owned = bytes.to_vec();
            match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned)).await {
                Ok(Ok(text)) => ExtractedContent::Text(text),
                Ok(Err(e)) => {
                    debug!(error = %e, "PDF text extraction failed");
                    ExtractedContent::Unreadable
                }
                // pdf-extract panics on some well-formed files (e.g. undefined fonts).
                Err(e) => {
                    warn!(error = %e, "PDF text extraction aborted");
                    ExtractedContent::Unreadable
                }
            }
        }
        AttachmentKind::Text => ExtractedContent::Text(String::from_utf8_lossy(bytes).into_owned()),
        AttachmentKind::Word | AttachmentKind::Image => ExtractedContent::NotExtracted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn save_writes_under_area() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let stored = store.save(MENTOR_AREA, "nota_1_2_3.txt", b"conteudo").await.unwrap();

        assert_eq!(stored.path, dir.path().join("mentor").join("nota_1_2_3.txt"));
        assert_eq!(stored.size_bytes, 8);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"conteudo");
    }

    /// One-page PDF whose content stream selects `/F1` without any
    /// `/Resources`, with a correct xref table.
    fn pdf_without_fonts() -> Vec<u8> {
        let content = "BT /F1 12 Tf 20 100 Td (ola) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 200] /Contents 4 0 R >>".to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref_at = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[tokio::test]
    async fn garbage_pdf_is_unreadable() {
        assert_eq!(
            extract_content(AttachmentKind::Pdf, b"not a pdf").await,
            ExtractedContent::Unreadable
        );
        assert_eq!(
            extract_content(AttachmentKind::Text, "olá".as_bytes()).await,
            ExtractedContent::Text("olá".into())
        );
    }

    #[tokio::test]
    async fn pdf_with_undefined_font_does_not_take_the_task_down() {
        let content = extract_content(AttachmentKind::Pdf, &pdf_without_fonts()).await;
        assert_eq!(content, ExtractedContent::Unreadable);
    }
}
