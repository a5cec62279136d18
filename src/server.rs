//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database
//! and migrations, the default admin account, the third-party adapters,
//! the REST API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::services::AuthService;
use crate::config::AppConfig;
use crate::domain::ports::{AiProvider, MessagingGateway, PaymentGateway};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{
    init_database, DatabaseConfig, GeminiClient, MercadoPagoClient, SeaOrmRepositoryProvider,
    UploadStore, WhatsappCloudClient,
};
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub const JWT_ISSUER: &str = "imobicontract-backend";

/// Options for starting the backend.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Create the configured admin account when it is missing (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// The global recorder can be installed once per process; restarts reuse it.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                error!("Failed to install Prometheus metrics recorder: {}", e);
                None
            }
        })
        .clone()
}

/// Handle to a running backend.
///
/// ```rust,no_run
/// use imobi_contract::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Address the API is bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting ImobiContract backend...");

        let metrics = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db_config = DatabaseConfig {
            url: app_cfg.database.url.clone(),
            max_connections: app_cfg.database.max_connections,
        };
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        let jwt_config = JwtConfig {
            secret: app_cfg.security.jwt_secret.clone(),
            expiration_hours: app_cfg.security.jwt_expiration_hours,
            issuer: JWT_ISSUER.to_string(),
        };
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        if opts.create_default_admin {
            let auth = AuthService::new(repos.clone(), jwt_config.clone());
            let admin = &app_cfg.admin;
            if let Err(e) = auth.ensure_admin(&admin.email, &admin.name, &admin.password).await {
                error!("Failed to create admin user: {}", e);
            }
        }

        // ── Third-party adapters ───────────────────────────────
        let ai: Arc<dyn AiProvider> = Arc::new(GeminiClient::new(app_cfg.gemini.clone()));
        if !ai.has_key() {
            warn!("GOOGLE_API_KEY not set; AI features answer with fallbacks or MISSING_GOOGLE_KEY");
        }
        let payments: Arc<dyn PaymentGateway> =
            Arc::new(MercadoPagoClient::new(app_cfg.mercado_pago.clone()));
        if !payments.is_configured() {
            warn!("Mercado Pago access token not set; checkout is disabled");
        }
        let messaging: Arc<dyn MessagingGateway> =
            Arc::new(WhatsappCloudClient::new(app_cfg.whatsapp.clone()));
        let missing = messaging.missing_config();
        if !missing.is_empty() {
            warn!(missing = ?missing, "WhatsApp Cloud API not fully configured");
        }
        let uploads = UploadStore::new(app_cfg.uploads.dir.clone());

        // ── REST API server ────────────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let api_router = create_api_router(ApiContext {
            db: db.clone(),
            repos: repos.clone(),
            config: app_cfg.clone(),
            jwt_config,
            ai,
            payments,
            messaging,
            uploads,
            metrics,
        });

        let api_addr = app_cfg.api_address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });
        info!("🚀 ImobiContract Backend Online!");

        Ok(Self {
            repos,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Waits for the shutdown signal, drains the API within the configured
    /// timeout and closes the database.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        let drained = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
            })
            .await;
        if !drained {
            warn!("In-flight requests were still running at the shutdown deadline");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }
        info!("👋 ImobiContract backend shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// `logging.level`.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_options() -> (ServerOptions, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("imobi.db").display()
        );
        config.uploads.dir = dir.path().join("uploads");
        (
            ServerOptions {
                config,
                ..ServerOptions::default()
            },
            dir,
        )
    }

    #[tokio::test]
    async fn starts_seeds_admin_and_stops() {
        let (opts, _dir) = test_options();
        let admin_email = opts.config.admin.email.clone();
        let handle = ServerHandle::start(opts).await.unwrap();
        assert!(handle.is_running());
        assert_ne!(handle.local_addr.port(), 0);

        let admin = handle.repos.users().find_by_email(&admin_email).await.unwrap();
        assert!(admin.is_some());

        tokio::time::timeout(Duration::from_secs(10), handle.shutdown())
            .await
            .expect("shutdown finished");
    }
}
