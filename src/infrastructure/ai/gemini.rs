//! Gemini REST client
//!
//! Implements [`AiProvider`] over `models/{model}:generateContent`. Each task
//! resolves to an ordered list of candidate models; a quota rejection moves
//! the request to the next candidate.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::domain::ports::{AiError, AiPart, AiProvider, AiReply, AiTask};
use crate::shared::{run_with_fallback, FallbackChain};

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Task override, then generic model, then the fallbacks, then the task
    /// default.
    pub fn chain(&self, task: AiTask) -> FallbackChain {
        let overrides = self.config.task(task);
        let primary = overrides
            .and_then(|t| t.model.clone())
            .or_else(|| self.config.model.clone())
            .unwrap_or_else(|| task.default_model().to_string());

        let rest = [
            overrides.and_then(|t| t.fallback.clone()),
            self.config.model_fallback.clone(),
            Some(task.default_model().to_string()),
        ];
        FallbackChain::new(primary, rest.into_iter().flatten())
    }

    async fn call_model(&self, key: &str, model: &str, body: &Value) -> Result<String, AiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        debug!(model, "Calling Gemini");

        let response = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        reply_text(&payload).ok_or(AiError::EmptyResponse)
    }
}

/// `generateContent` request body for a single user turn.
pub fn request_body(parts: &[AiPart]) -> Value {
    let parts: Vec<Value> = parts
        .iter()
        .map(|part| match part {
            AiPart::Text(text) => json!({ "text": text }),
            AiPart::InlineData { mime_type, base64 } => json!({
                "inlineData": { "mimeType": mime_type, "data": base64 }
            }),
        })
        .collect();
    json!({ "contents": [{ "role": "user", "parts": parts }] })
}

/// Concatenated text parts of the first candidate.
pub fn reply_text(payload: &Value) -> Option<String> {
    let parts = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl AiProvider for GeminiClient {
    fn has_key(&self) -> bool {
        self.api_key().is_some()
    }

    fn candidates(&self, task: AiTask) -> Vec<String> {
        self.chain(task).candidates().map(str::to_string).collect()
    }

    async fn generate(&self, task: AiTask, parts: Vec<AiPart>) -> Result<AiReply, AiError> {
        let key = self.api_key().ok_or(AiError::MissingKey)?.to_string();
        let chain = self.chain(task);
        let body = request_body(&parts);

        let outcome = run_with_fallback(
            &chain,
            |model| {
                let key = key.clone();
                let body = &body;
                async move { self.call_model(&key, &model, body).await }
            },
            AiError::is_quota,
            |_, _| {
                metrics::counter!("ai_model_fallback_total", "task" => task.as_str()).increment(1);
            },
            task.as_str(),
        )
        .await?;

        Ok(AiReply {
            text: outcome.value,
            model: outcome.candidate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskModel;

    fn client(config: GeminiConfig) -> GeminiClient {
        GeminiClient::new(config)
    }

    #[test]
    fn defaults_to_task_model() {
        let c = client(GeminiConfig::default());
        assert_eq!(c.candidates(AiTask::Summary), vec!["gemini-2.5-flash-lite"]);
        assert!(!c.has_key());
    }

    #[test]
    fn candidate_order_and_dedup() {
        let mut config = GeminiConfig {
            api_key: Some("k".into()),
            model: Some("gemini-generic".into()),
            model_fallback: Some("gemini-2.5-flash".into()),
            ..Default::default()
        };
        config.tasks.insert(
            "inspection".into(),
            TaskModel {
                model: Some("gemini-vision".into()),
                fallback: Some("gemini-vision-lite".into()),
            },
        );
        let c = client(config);

        assert_eq!(
            c.candidates(AiTask::Inspection),
            vec!["gemini-vision", "gemini-vision-lite", "gemini-2.5-flash"]
        );
        assert_eq!(
            c.candidates(AiTask::Mentor),
            vec!["gemini-generic", "gemini-2.5-flash", "gemini-2.5-flash-live"]
        );
        assert!(c.has_key());
    }

    #[test]
    fn body_carries_inline_images() {
        let body = request_body(&[
            AiPart::Text("descreva".into()),
            AiPart::InlineData {
                mime_type: "image/png".into(),
                base64: "AAAA".into(),
            },
        ]);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "descreva");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
    }

    #[test]
    fn reply_joins_text_parts() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [{ "text": "po" }, { "text": "ng" }] } }]
        });
        assert_eq!(reply_text(&payload).as_deref(), Some("pong"));
        assert_eq!(reply_text(&json!({ "candidates": [] })), None);
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let err = client(GeminiConfig::default())
            .generate(AiTask::Mentor, vec![AiPart::Text("oi".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::MissingKey));
    }
}
