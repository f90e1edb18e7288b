use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub credentials: CredentialConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix for every API route. Empty or "/" mounts the routes at the root.
    pub base_path: String,
    pub request_timeout_secs: u64,
}

/// Which record store implementation backs the technician table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub require_ssl: bool,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout_secs: u64,
    /// Seed account for the in-memory credential store
    pub dev_admin_email: Option<String>,
    pub dev_admin_password: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "[redacted]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("dev_admin_email", &self.dev_admin_email)
            .field("dev_admin_password", &self.dev_admin_password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Status returned by the verification endpoint for a denied phone
    pub denied_status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub security_headers: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").or_else(|_| env::var("NODE_ENV"));
        let environment = match app_env.as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_BASE_PATH") {
            self.server.base_path = v.trim().to_string();
        }
        if let Ok(v) = env::var("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("RECORD_STORE") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" | "postgresql" => StoreBackend::Postgres,
                _ => self.database.backend,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_REQUIRE_SSL") {
            self.database.require_ssl = v.parse().unwrap_or(self.database.require_ssl);
        }

        // Credential store overrides
        if let Ok(v) = env::var("SUPABASE_URL") {
            self.credentials.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY") {
            self.credentials.anon_key = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SUPABASE_TIMEOUT_SECS") {
            self.credentials.timeout_secs = v.parse().unwrap_or(self.credentials.timeout_secs);
        }
        if let Ok(v) = env::var("DEV_ADMIN_EMAIL") {
            self.credentials.dev_admin_email = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DEV_ADMIN_PASSWORD") {
            self.credentials.dev_admin_password = Some(v).filter(|s| !s.is_empty());
        }

        // API overrides
        if let Ok(v) = env::var("API_DENIED_STATUS") {
            self.api.denied_status = v.parse().unwrap_or(self.api.denied_status);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("SECURITY_HEADERS") {
            self.security.security_headers = v.parse().unwrap_or(self.security.security_headers);
        }

        self
    }

    /// Check that everything the selected backends need is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_record_store()?;
        self.validate_credentials()?;

        if !(200..=599).contains(&self.api.denied_status) {
            return Err(ConfigError::Invalid {
                name: "API_DENIED_STATUS",
                value: self.api.denied_status.to_string(),
            });
        }

        Ok(())
    }

    pub fn validate_record_store(&self) -> Result<(), ConfigError> {
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        if self.database.backend == StoreBackend::Postgres {
            if self.credentials.url.is_none() {
                return Err(ConfigError::Missing("SUPABASE_URL"));
            }
            if self.credentials.anon_key.is_none() {
                return Err(ConfigError::Missing("SUPABASE_ANON_KEY"));
            }
        }

        if let Some(url) = &self.credentials.url {
            url::Url::parse(url).map_err(|_| ConfigError::Invalid {
                name: "SUPABASE_URL",
                value: url.clone(),
            })?;
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                base_path: "/api".to_string(),
                request_timeout_secs: 30,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                require_ssl: false,
            },
            credentials: CredentialConfig::defaults(10),
            api: ApiConfig { denied_status: 205 },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                security_headers: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                base_path: "/api".to_string(),
                request_timeout_secs: 15,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                require_ssl: true,
            },
            credentials: CredentialConfig::defaults(10),
            api: ApiConfig { denied_status: 205 },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                security_headers: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                base_path: "/api".to_string(),
                request_timeout_secs: 10,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                require_ssl: true,
            },
            credentials: CredentialConfig::defaults(5),
            api: ApiConfig { denied_status: 205 },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                security_headers: true,
            },
        }
    }
}

impl CredentialConfig {
    fn defaults(timeout_secs: u64) -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_secs,
            dev_admin_email: None,
            dev_admin_password: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}
