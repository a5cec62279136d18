//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::services::{
    AssistantService, AuthService, BillingService, ContractService, DashboardService,
    InspectionService, MentorService, NotificationService, PartyService, PropertyService,
    SettingsService, UsageService, WhatsappService,
};
use crate::config::AppConfig;
use crate::domain::party::PartyRole;
use crate::domain::ports::{AiProvider, MessagingGateway, PaymentGateway};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::JwtConfig;
use crate::infrastructure::UploadStore;
use crate::interfaces::http::common::{ErrorBody, ErrorDetail, OkResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};

use super::modules::{
    assistant, auth, billing, contracts, dashboard, health, inspections, mentor, metrics,
    notifications, parties, properties, settings, usage, whatsapp,
};

const MB: usize = 1024 * 1024;
/// Ten photos of up to 5 MB plus the form fields.
const ANALYZE_BODY_LIMIT: usize = 60 * MB;
/// Three attachments of up to 10 MB plus the question.
const MENTOR_BODY_LIMIT: usize = 35 * MB;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::banner,
        health::health_check,
        assistant::ai_health,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Usage
        usage::my_usage,
        mentor::mentor_usage,
        // Tenants & landlords
        parties::list_parties,
        parties::get_party,
        parties::create_party,
        parties::update_party,
        parties::delete_party,
        // Properties
        properties::list_properties,
        properties::create_property,
        properties::update_property,
        properties::delete_property,
        // Contracts
        contracts::list_contracts,
        contracts::get_contract,
        contracts::create_contract,
        // Notifications
        notifications::list_templates,
        notifications::render_template,
        notifications::list_notifications,
        notifications::create_notification,
        notifications::update_notification,
        // Inspections
        inspections::list_inspections,
        inspections::get_inspection,
        inspections::create_inspection,
        inspections::update_inspection_status,
        inspections::add_addendum,
        inspections::add_manual_note,
        inspections::analyze_inspection,
        inspections::report_pdf,
        // Assistant & mentor
        assistant::chat,
        mentor::ask_mentor,
        // WhatsApp
        whatsapp::send_message,
        whatsapp::whatsapp_health,
        whatsapp::send_test,
        whatsapp::send_test_template,
        whatsapp::verify_webhook,
        whatsapp::receive_webhook,
        whatsapp::list_contacts,
        whatsapp::list_conversations,
        whatsapp::list_messages,
        // Billing
        billing::create_checkout,
        billing::mercadopago_webhook,
        billing::subscription_status,
        // Dashboard
        dashboard::dashboard_summary,
        dashboard::my_overview,
        // Settings
        settings::get_settings,
        settings::update_settings,
    ),
    components(
        schemas(
            // Common
            ErrorBody,
            ErrorDetail,
            OkResponse,
            // Auth
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UserDto,
            usage::UsageResponse,
            // Registry
            parties::PersonRequest,
            parties::PartyDto,
            parties::PersonSummaryDto,
            properties::PropertyRequest,
            properties::PropertyDto,
            contracts::ContractDto,
            contracts::CreatedContractResponse,
            // Notifications
            notifications::TemplateDto,
            notifications::RenderRequest,
            notifications::NotificationDto,
            // Inspections
            inspections::InspectionDto,
            inspections::StatusRequest,
            inspections::TextRequest,
            // WhatsApp
            whatsapp::SendMessageRequest,
            whatsapp::SendResult,
            whatsapp::ConversationDto,
            whatsapp::MessageDto,
            // Billing & settings
            billing::CheckoutBody,
            settings::SettingsDto,
            settings::UpdateSettingsRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and dependency checks"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Usage", description = "Monthly plan usage"),
        (name = "Tenants & Landlords", description = "People registry, served under /api/tenants and /api/landlords"),
        (name = "Properties", description = "Property registry"),
        (name = "Contracts", description = "Lease contracts and generated text"),
        (name = "Notifications", description = "Notice templates and notices sent to tenants"),
        (name = "Inspections", description = "Inspections, AI photo analysis and PDF reports"),
        (name = "Assistant", description = "Real-estate chat assistant"),
        (name = "Mentor", description = "Questions with file attachments"),
        (name = "WhatsApp", description = "WhatsApp Cloud API messaging"),
        (name = "Billing", description = "Mercado Pago subscriptions"),
        (name = "Dashboard", description = "Counters for the home screen"),
        (name = "Settings", description = "Account-wide settings"),
    ),
    info(
        title = "ImobiContract API",
        version = "1.0.0",
        description = "Backend for real-estate agencies: registry, contracts, notices, inspections and plan quotas"
    )
)]
pub struct ApiDoc;

/// Everything the router needs to build its services.
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    pub jwt_config: JwtConfig,
    pub ai: Arc<dyn AiProvider>,
    pub payments: Arc<dyn PaymentGateway>,
    pub messaging: Arc<dyn MessagingGateway>,
    pub uploads: UploadStore,
    /// `None` leaves `/metrics` unmounted.
    pub metrics: Option<PrometheusHandle>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let repos = ctx.repos.clone();
    let config = &ctx.config;

    let middleware_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };

    // ── Services ───────────────────────────────────────────────
    let assistant_service = Arc::new(AssistantService::new(ctx.ai.clone()));
    let auth_state = auth::AuthHandlerState {
        auth_service: Arc::new(AuthService::new(repos.clone(), ctx.jwt_config.clone())),
    };
    let usage_state = usage::UsageHandlerState {
        usage_service: Arc::new(UsageService::new(repos.clone())),
    };
    let party_service = Arc::new(PartyService::new(repos.clone()));
    let property_state = properties::PropertyHandlerState {
        property_service: Arc::new(PropertyService::new(repos.clone())),
    };
    let contract_state = contracts::ContractHandlerState {
        contract_service: Arc::new(ContractService::new(repos.clone())),
    };
    let notification_state = notifications::NotificationHandlerState {
        notification_service: Arc::new(NotificationService::new(repos.clone())),
    };
    let inspection_state = inspections::InspectionHandlerState {
        inspection_service: Arc::new(InspectionService::new(repos.clone(), ctx.ai.clone())),
    };
    let assistant_state = assistant::AssistantHandlerState {
        assistant_service: assistant_service.clone(),
    };
    let mentor_state = mentor::MentorHandlerState {
        mentor_service: Arc::new(MentorService::new(
            repos.clone(),
            assistant_service,
            ctx.uploads.clone(),
        )),
    };
    let whatsapp_state = whatsapp::WhatsappHandlerState {
        whatsapp_service: Arc::new(WhatsappService::new(
            repos.clone(),
            ctx.messaging.clone(),
            config.whatsapp.clone(),
        )),
    };
    let billing_state = billing::BillingHandlerState {
        billing_service: Arc::new(BillingService::new(
            repos.clone(),
            ctx.payments.clone(),
            &config.app,
        )),
    };
    let dashboard_state = dashboard::DashboardHandlerState {
        dashboard_service: Arc::new(DashboardService::new(repos.clone())),
    };
    let settings_state = settings::SettingsHandlerState {
        settings_service: Arc::new(SettingsService::new(repos)),
    };
    let health_state = health::HealthState {
        db: ctx.db.clone(),
        started_at: Arc::new(Instant::now()),
    };

    let auth_layer = || middleware::from_fn_with_state(middleware_state.clone(), auth_middleware);

    // ── Public routes (rate limited) ───────────────────────────

    let auth_public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .with_state(auth_state.clone());

    let template_routes = Router::new()
        .route("/", get(notifications::list_templates))
        .route("/{type}/render", post(notifications::render_template))
        .with_state(notification_state.clone());

    let billing_routes = Router::new()
        .route("/create-checkout", post(billing::create_checkout))
        .route("/webhook/mercadopago", post(billing::mercadopago_webhook))
        .route("/subscription-status", get(billing::subscription_status))
        .with_state(billing_state);

    let whatsapp_webhook_routes = Router::new()
        .route(
            "/webhook",
            get(whatsapp::verify_webhook).post(whatsapp::receive_webhook),
        )
        .with_state(whatsapp_state.clone());

    let mut public_routes = Router::new()
        .nest("/api/auth", auth_public_routes)
        .nest("/api/notifications/templates", template_routes)
        .nest("/api/billing", billing_routes)
        .nest("/api/whatsapp", whatsapp_webhook_routes);

    if config.rate_limit.enabled {
        match GovernorConfigBuilder::default()
            .per_second(config.rate_limit.per_second.max(1))
            .burst_size(config.rate_limit.burst.max(1))
            .finish()
        {
            Some(governor) => {
                public_routes = public_routes.layer(GovernorLayer::new(Arc::new(governor)));
            }
            None => warn!("Invalid rate limit settings; public routes are not rate limited"),
        }
    }

    // ── Protected routes ───────────────────────────────────────

    let auth_protected_routes = Router::new()
        .route("/me", get(auth::me))
        .layer(auth_layer())
        .with_state(auth_state);

    let usage_routes = Router::new()
        .route("/me", get(usage::my_usage))
        .layer(auth_layer())
        .with_state(usage_state);

    let party_routes = |role: PartyRole| {
        Router::new()
            .route("/", get(parties::list_parties).post(parties::create_party))
            .route(
                "/{id}",
                get(parties::get_party)
                    .put(parties::update_party)
                    .delete(parties::delete_party),
            )
            .layer(auth_layer())
            .with_state(parties::PartyHandlerState {
                party_service: party_service.clone(),
                role,
            })
    };

    let property_routes = Router::new()
        .route(
            "/",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/{id}",
            put(properties::update_property).delete(properties::delete_property),
        )
        .layer(auth_layer())
        .with_state(property_state);

    let contract_routes = Router::new()
        .route(
            "/",
            get(contracts::list_contracts).post(contracts::create_contract),
        )
        .route("/{id}", get(contracts::get_contract))
        .layer(auth_layer())
        .with_state(contract_state);

    let notification_routes = Router::new()
        .route(
            "/",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route("/{id}", put(notifications::update_notification))
        .layer(auth_layer())
        .with_state(notification_state);

    let inspection_routes = Router::new()
        .route(
            "/",
            get(inspections::list_inspections).post(inspections::create_inspection),
        )
        .route(
            "/analyze",
            post(inspections::analyze_inspection).layer(DefaultBodyLimit::max(ANALYZE_BODY_LIMIT)),
        )
        .route("/{id}", get(inspections::get_inspection))
        .route("/{id}/status", patch(inspections::update_inspection_status))
        .route("/{id}/addendums", post(inspections::add_addendum))
        .route("/{id}/manual-notes", post(inspections::add_manual_note))
        .route("/{id}/report-pdf", get(inspections::report_pdf))
        .layer(auth_layer())
        .with_state(inspection_state);

    let chat_routes = Router::new()
        .route("/", post(assistant::chat))
        .layer(auth_layer())
        .with_state(assistant_state.clone());

    let mentor_routes = Router::new()
        .route("/usage", get(mentor::mentor_usage))
        .route(
            "/ask",
            post(mentor::ask_mentor).layer(DefaultBodyLimit::max(MENTOR_BODY_LIMIT)),
        )
        .layer(auth_layer())
        .with_state(mentor_state);

    let whatsapp_routes = Router::new()
        .route("/send", post(whatsapp::send_message))
        .route("/health", get(whatsapp::whatsapp_health))
        .route("/test", post(whatsapp::send_test))
        .route("/test-template", post(whatsapp::send_test_template))
        .route("/contacts", get(whatsapp::list_contacts))
        .route("/conversations", get(whatsapp::list_conversations))
        .route("/conversations/{id}/messages", get(whatsapp::list_messages))
        .layer(auth_layer())
        .with_state(whatsapp_state);

    let dashboard_routes = Router::new()
        .route("/api/dashboard/summary", get(dashboard::dashboard_summary))
        .route("/api/overview/me", get(dashboard::my_overview))
        .layer(auth_layer())
        .with_state(dashboard_state);

    let settings_routes = Router::new()
        .route("/", get(settings::get_settings).put(settings::update_settings))
        .layer(auth_layer())
        .with_state(settings_state);

    // ── Unauthenticated infrastructure routes ──────────────────

    let health_routes = Router::new()
        .route("/", get(health::banner))
        .route("/health", get(health::health_check))
        .with_state(health_state)
        .merge(
            Router::new()
                .route("/health/gemini", get(assistant::ai_health))
                .with_state(assistant_state),
        );

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        // Swagger UI
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(public_routes)
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/usage", usage_routes)
        .nest("/api/tenants", party_routes(PartyRole::Tenant))
        .nest("/api/landlords", party_routes(PartyRole::Landlord))
        .nest("/api/properties", property_routes)
        .nest("/api/contracts", contract_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/inspections", inspection_routes)
        .nest("/api/chat", chat_routes)
        .nest("/api/mentor", mentor_routes)
        .nest("/api/whatsapp", whatsapp_routes)
        .merge(dashboard_routes)
        .nest("/api/settings", settings_routes);

    if let Some(handle) = ctx.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::render_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .route_layer(middleware::from_fn(metrics::track_http_metrics))
        .layer(DefaultBodyLimit::max(config.server.body_limit_mb.max(1) * MB))
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
}
