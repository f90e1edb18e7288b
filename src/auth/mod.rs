//! Credential store: the external identity provider that validates
//! email/password logins and bearer tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub mod memory;
pub mod supabase;

pub use memory::MemoryCredentialStore;
pub use supabase::SupabaseAuth;

/// Identity resolved from a login or a bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub aud: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: Value,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            aud: Some("authenticated".to_string()),
            role: Some("authenticated".to_string()),
            email: Some(email.into()),
            phone: None,
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
            app_metadata: Value::Null,
            user_metadata: Value::Null,
        }
    }
}

/// Token set issued by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
    pub refresh_token: Option<String>,
    pub user: AuthUser,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Credential store misconfigured: {0}")]
    Misconfigured(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected credential store response: {0}")]
    UnexpectedResponse(String),
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CredentialError>;

    /// Resolve a bearer token to its user
    async fn get_user(&self, token: &str) -> Result<AuthUser, CredentialError>;

    /// Revoke every session of the token's owner. Without a token there is
    /// nothing to revoke and the call succeeds.
    async fn sign_out(&self, token: Option<&str>) -> Result<(), CredentialError>;
}
