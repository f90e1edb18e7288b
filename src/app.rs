use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn_with_state, map_response},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{CredentialStore, MemoryCredentialStore, SupabaseAuth};
use crate::config::{AppConfig, SecurityConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryTechnicianStore, PgTechnicianStore, TechnicianStore};
use crate::handlers::{protected, public};
use crate::middleware::{json_error_bodies, require_auth, security_headers};
use crate::services::{AuthorizationChecker, TechnicianService};

/// Shared handler state. Every dependency is injected here; nothing reads
/// global configuration at request time.
#[derive(Clone)]
pub struct AppState {
    pub technicians: TechnicianService,
    pub checker: AuthorizationChecker,
    pub credentials: Arc<dyn CredentialStore>,
    pub store: Arc<dyn TechnicianStore>,
    pub denied_status: StatusCode,
    pub base_path: String,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TechnicianStore>,
        credentials: Arc<dyn CredentialStore>,
        denied_status: StatusCode,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            technicians: TechnicianService::new(store.clone()),
            checker: AuthorizationChecker::new(store.clone()),
            credentials,
            store,
            denied_status,
            base_path: normalize_base_path(&base_path.into()),
        }
    }
}

/// Wire the record store and credential store selected by the configuration
pub fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate().context("invalid configuration")?;

    let denied_status = StatusCode::from_u16(config.api.denied_status)
        .with_context(|| format!("invalid denied status {}", config.api.denied_status))?;

    let store = build_store(config)?;
    let credentials = build_credentials(config)?;

    Ok(AppState::new(store, credentials, denied_status, config.server.base_path.clone()))
}

/// Record store for the configured backend. The Postgres pool connects lazily.
pub fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TechnicianStore>> {
    config.validate_record_store().context("invalid record store configuration")?;

    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).context("failed to configure database pool")?;
            tracing::info!("Using Postgres record store");
            Ok(Arc::new(PgTechnicianStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on restart");
            Ok(Arc::new(MemoryTechnicianStore::new()))
        }
    }
}

fn build_credentials(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let auth = SupabaseAuth::new(&config.credentials).context("failed to configure credential store")?;
            Ok(Arc::new(auth))
        }
        StoreBackend::Memory => {
            let mut auth = MemoryCredentialStore::new();
            match (&config.credentials.dev_admin_email, &config.credentials.dev_admin_password) {
                (Some(email), Some(password)) => {
                    tracing::info!("Seeded in-memory credential store with {}", email);
                    auth = auth.with_user(email, password);
                }
                _ => tracing::warn!("In-memory credential store has no accounts; set DEV_ADMIN_EMAIL and DEV_ADMIN_PASSWORD"),
            }
            Ok(Arc::new(auth))
        }
    }
}

/// Build the full HTTP application
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = api_routes(state.clone());

    let router = match state.base_path.as_str() {
        "" => Router::new().merge(api),
        base => Router::new().nest(base, api),
    }
    .route("/", get(public::system::root))
    .route("/health", get(public::system::health))
    .fallback(public::system::not_found)
    .with_state(state)
    .layer(TimeoutLayer::new(config.request_timeout()))
    .layer(map_response(json_error_bodies))
    .layer(TraceLayer::new_for_http());

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security))
    } else {
        router
    };

    if config.security.security_headers {
        security_headers::apply(router)
    } else {
        router
    }
}

fn api_routes(state: AppState) -> Router<AppState> {
    // Reads are public; mutations and /auth/me go through the bearer guard
    let guarded = |route: MethodRouter<AppState>| route.route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/verificar-tecnico/:telefone", get(public::verificar::verificar_tecnico))
        .route(
            "/tecnicos",
            get(public::tecnicos::list).merge(guarded(post(protected::tecnicos::create))),
        )
        .route(
            "/tecnicos/:id",
            get(public::tecnicos::get).merge(guarded(
                put(protected::tecnicos::update).delete(protected::tecnicos::delete),
            )),
        )
        .route("/auth/login", post(public::auth::login))
        .route("/auth/logout", post(public::auth::logout))
        .route("/auth/me", guarded(get(protected::auth::me)))
        .route("/roles", get(public::roles::list))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// "/api/" and "api" both become "/api"; "" and "/" mount at the root.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
