#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use sqlx::PgPool;

use tecnicos_api::auth::MemoryCredentialStore;
use tecnicos_api::config::{DatabaseConfig, StoreBackend};
use tecnicos_api::database::{DatabaseManager, MemoryTechnicianStore};
use tecnicos_api::{app, AppConfig, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// API server running in-process on a free port, backed by the in-memory
/// stores so tests can inspect and break them.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub api_url: String,
    pub store: Arc<MemoryTechnicianStore>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::default();
        let store = Arc::new(MemoryTechnicianStore::new());
        let credentials = Arc::new(MemoryCredentialStore::new().with_user(ADMIN_EMAIL, ADMIN_PASSWORD));
        let denied_status = axum::http::StatusCode::from_u16(config.api.denied_status)?;
        let state = AppState::new(store.clone(), credentials.clone(), denied_status, config.server.base_path.clone());
        let router = app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            api_url: format!("{}{}", base_url, config.server.base_path),
            base_url,
            store,
            credentials,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn api(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Log in as the seeded admin and return the access token
    pub async fn login(&self) -> Result<String> {
        let res = self
            .client
            .post(self.api("/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["session"]["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no access token")
    }

    /// Create a technician through the API and return the response body
    pub async fn create_technician(&self, token: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.api("/tecnicos"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }
}

/// Table layout the Postgres store is written against
const TECNICOS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tecnicos (
    id SERIAL PRIMARY KEY,
    nome TEXT NOT NULL,
    telefone TEXT NOT NULL,
    ativo BOOLEAN NOT NULL DEFAULT true,
    data_criacao TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT tecnicos_telefone_key UNIQUE (telefone)
)";

/// Pool against `DATABASE_URL` with the `tecnicos` table in place, or `None`
/// when no database is configured (the caller should skip).
pub async fn pg_pool() -> Result<Option<PgPool>> {
    // Pick up DATABASE_URL from .env the same way the server does
    let _ = dotenvy::dotenv();
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping Postgres store test");
            return Ok(None);
        }
    };

    let pool = DatabaseManager::connect(&DatabaseConfig {
        backend: StoreBackend::Postgres,
        url: Some(url),
        max_connections: 2,
        connection_timeout: 10,
        require_ssl: false,
    })?;

    // Tests in one binary run concurrently; serialize the DDL
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(7150001)").execute(&mut *tx).await?;
    sqlx::query(TECNICOS_SCHEMA).execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(Some(pool))
}

/// Phone number no other test run can collide with
pub fn unique_phone(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn count_by_phone(pool: &PgPool, phone: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM tecnicos WHERE telefone = $1")
        .bind(phone)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
