//! Application configuration
//!
//! Loaded from a TOML file (`IMOBI_CONFIG` or
//! `~/.config/imobi-contract/config.toml`), then overridden by environment
//! variables. A missing file yields the defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ports::AiTask;

pub const CONFIG_ENV: &str = "IMOBI_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub app: PublicUrls,
    pub gemini: GeminiConfig,
    pub mercado_pago: MercadoPagoConfig,
    pub whatsapp: WhatsappConfig,
    pub uploads: UploadsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds granted to in-flight requests after a shutdown signal.
    pub shutdown_timeout: u64,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 4000,
            shutdown_timeout: 30,
            cors_origins: Vec::new(),
            body_limit_mb: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: crate::infrastructure::database::DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or anything else for human-readable output.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@imobicontract.local".to_string(),
            name: "Administrador".to_string(),
            password: "admin12345".to_string(),
        }
    }
}

/// Token bucket applied to the unauthenticated routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds between replenished requests.
    pub per_second: u64,
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 1,
            burst: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicUrls {
    pub api_base_url: String,
    pub frontend_base_url: String,
}

impl Default for PublicUrls {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000".to_string(),
            frontend_base_url: "http://localhost:5173".to_string(),
        }
    }
}

/// Per-task model pinning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskModel {
    pub model: Option<String>,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Generic model used by tasks without their own override.
    pub model: Option<String>,
    pub model_fallback: Option<String>,
    /// Keyed by task name (`mentor`, `contract`, `inspection`, `summary`,
    /// `notification`).
    pub tasks: HashMap<String, TaskModel>,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: None,
            model_fallback: None,
            tasks: HashMap::new(),
            timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    pub fn task(&self, task: AiTask) -> Option<&TaskModel> {
        self.tasks.get(task.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MercadoPagoConfig {
    pub access_token: Option<String>,
    pub base_url: String,
}

impl Default for MercadoPagoConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: "https://api.mercadopago.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsappConfig {
    pub base_url: String,
    pub phone_number_id: String,
    pub api_token: String,
    pub webhook_verify_token: String,
    /// Recipient of the `/test` and `/test-template` messages.
    pub test_to: Option<String>,
    /// Account that owns conversations started by inbound messages.
    pub inbound_user_id: i32,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            phone_number_id: String::new(),
            api_token: String::new(),
            webhook_verify_token: String::new(),
            test_to: None,
            inbound_user_id: 1,
        }
    }
}

impl WhatsappConfig {
    /// Names of the settings that are still empty, in env-var form.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("WHATSAPP_API_BASE_URL", &self.base_url),
            ("WHATSAPP_PHONE_NUMBER_ID", &self.phone_number_id),
            ("WHATSAPP_API_TOKEN", &self.api_token),
            ("WHATSAPP_WEBHOOK_VERIFY_TOKEN", &self.webhook_verify_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Sending only needs the endpoint and credentials.
    pub fn can_send(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.phone_number_id.trim().is_empty()
            && !self.api_token.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
        }
    }
}

/// `~/.config/imobi-contract/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("imobi-contract").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Path from `IMOBI_CONFIG`, else the default location.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

impl AppConfig {
    /// Reads `path` when it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Overrides settings from the environment. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(url) = get("API_BASE_URL") {
            self.app.api_base_url = url;
        }
        if let Some(url) = get("FRONTEND_BASE_URL") {
            self.app.frontend_base_url = url;
        }

        if let Some(key) = get("GOOGLE_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = Some(model);
        }
        if let Some(model) = get("GEMINI_MODEL_FALLBACK") {
            self.gemini.model_fallback = Some(model);
        }
        for task in AiTask::ALL {
            let suffix = match task {
                AiTask::Inspection => "VISTORIA",
                AiTask::Mentor => "MENTOR",
                AiTask::Contract => "CONTRACT",
                AiTask::Summary => "SUMMARY",
                AiTask::Notification => "NOTIFICATION",
            };
            let primary = get(&format!("GEMINI_MODEL_{suffix}"));
            let fallback = get(&format!("GEMINI_MODEL_{suffix}_FALLBACK"));
            if primary.is_none() && fallback.is_none() {
                continue;
            }
            let entry = self.gemini.tasks.entry(task.as_str().to_string()).or_default();
            if primary.is_some() {
                entry.model = primary;
            }
            if fallback.is_some() {
                entry.fallback = fallback;
            }
        }

        if let Some(token) = get("MP_ACCESS_TOKEN").or_else(|| get("MERCADO_PAGO_ACCESS_TOKEN")) {
            self.mercado_pago.access_token = Some(token);
        }

        if let Some(v) = get("WHATSAPP_API_BASE_URL") {
            self.whatsapp.base_url = v;
        }
        if let Some(v) = get("WHATSAPP_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = v;
        }
        if let Some(v) = get("WHATSAPP_API_TOKEN") {
            self.whatsapp.api_token = v;
        }
        if let Some(v) = get("WHATSAPP_WEBHOOK_VERIFY_TOKEN") {
            self.whatsapp.webhook_verify_token = v;
        }
        if let Some(v) = get("WHATSAPP_TEST_TO") {
            self.whatsapp.test_to = Some(v);
        }
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.server.api_host, self.server.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            api_port = 8080

            [gemini.tasks.inspection]
            model = "gemini-vision-x"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.security.jwt_expiration_hours, 24);
        assert_eq!(
            config.gemini.task(AiTask::Inspection).and_then(|t| t.model.as_deref()),
            Some("gemini-vision-x")
        );
        assert_eq!(config.whatsapp.inbound_user_id, 1);
    }

    #[test]
    fn env_overrides_win_and_blank_is_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GOOGLE_API_KEY", "k-123"),
            ("MERCADO_PAGO_ACCESS_TOKEN", "mp-token"),
            ("GEMINI_MODEL_VISTORIA_FALLBACK", "gemini-lite"),
            ("JWT_SECRET", "   "),
            ("WHATSAPP_API_TOKEN", "wa-token"),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.gemini.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.mercado_pago.access_token.as_deref(), Some("mp-token"));
        assert_eq!(
            config.gemini.task(AiTask::Inspection).and_then(|t| t.fallback.as_deref()),
            Some("gemini-lite")
        );
        assert_eq!(config.security.jwt_secret, SecurityConfig::default().jwt_secret);
        assert_eq!(config.whatsapp.api_token, "wa-token");
    }

    #[test]
    fn whatsapp_missing_lists_env_names() {
        let config = WhatsappConfig {
            base_url: "https://graph.facebook.com/v20.0".into(),
            phone_number_id: "123".into(),
            ..Default::default()
        };
        assert_eq!(
            config.missing(),
            vec!["WHATSAPP_API_TOKEN", "WHATSAPP_WEBHOOK_VERIFY_TOKEN"]
        );
        assert!(!config.can_send());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.api_port, 4000);
    }
}
