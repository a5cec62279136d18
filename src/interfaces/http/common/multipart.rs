//! Collects a multipart form into named text fields and uploaded files

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::warn;

use super::ApiError;

#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: Vec<FilePart>,
    fields: HashMap<String, Vec<String>>,
}

impl MultipartForm {
    /// Reads every part. Parts named `file_field` are kept as files;
    /// everything else is read as text. A trailing `[]` on a field name is
    /// dropped so `notas[]` and `notas` collect together.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(|err| {
            warn!(error = %err, "Malformed multipart body");
            ApiError::bad_request("INVALID_MULTIPART", "Formulário multipart inválido.")
        })? {
            let name = field
                .name()
                .unwrap_or_default()
                .trim_end_matches("[]")
                .to_string();

            if name == file_field {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    warn!(error = %err, "Upload interrupted");
                    ApiError::bad_request("INVALID_MULTIPART", "Falha ao ler arquivo enviado.")
                })?;
                form.files.push(FilePart {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(|_| {
                    ApiError::bad_request("INVALID_MULTIPART", "Campo de texto inválido.")
                })?;
                form.fields.entry(name).or_default().push(value);
            }
        }
        Ok(form)
    }

    /// First value sent under `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|v| v.first()).cloned()
    }

    /// Every value sent under `name`, in order.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Like `list`, but `None` when the field never appeared.
    pub fn list_opt(&self, name: &str) -> Option<Vec<String>> {
        self.fields.get(name).cloned()
    }
}
