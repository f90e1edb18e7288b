use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Phone number already registered: {0}")]
    DuplicatePhone(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Name of the unique constraint guarding `tecnicos.telefone`
pub const PHONE_UNIQUE_CONSTRAINT: &str = "tecnicos_telefone_key";

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl DatabaseError {
    /// Map a driver error raised by an insert/update on `tecnicos`, turning a
    /// violation of the phone constraint into `DuplicatePhone`.
    pub fn from_write(err: sqlx::Error, phone: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(PHONE_UNIQUE_CONSTRAINT)
            {
                return DatabaseError::DuplicatePhone(phone.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the connection pool for the record store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool from configuration. The pool connects lazily so the server
    /// can start (and report degraded health) while the database is down.
    pub fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = Self::connect_options(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options);

        info!(
            "Created database pool (max_connections={}, ssl={})",
            config.max_connections, config.require_ssl
        );
        Ok(pool)
    }

    fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let options = PgConnectOptions::from_str(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        // Managed Postgres terminates TLS with certificates we do not pin
        Ok(if config.require_ssl {
            options.ssl_mode(PgSslMode::Require)
        } else {
            options
        })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Close the pool on shutdown
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}
