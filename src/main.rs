//! ImobiContract backend
//!
//! Reads configuration from a TOML file (`IMOBI_CONFIG` or
//! `~/.config/imobi-contract/config.toml`) plus environment overrides.

use tracing::{error, info};

use imobi_contract::config::{config_path, AppConfig};
use imobi_contract::server::{init_tracing, ServerHandle, ServerOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path();
    let (config, load_error) = match AppConfig::load(&path) {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = AppConfig::default();
            config.apply_env(|name| std::env::var(name).ok());
            (config, Some(e))
        }
    };

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        ..ServerOptions::default()
    })
    .await?;
    handle.install_signal_handler();
    handle.wait().await;
    Ok(())
}
