use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthUser, CredentialError, CredentialStore, Session};

const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

struct Account {
    password: String,
    user: AuthUser,
}

struct IssuedToken {
    user: AuthUser,
    expires_at: DateTime<Utc>,
}

/// In-process credential store for local development and tests. Tokens are
/// random opaque strings valid until `expires_at` or until their owner signs
/// out; expired tokens are pruned on lookup.
pub struct MemoryCredentialStore {
    accounts: HashMap<String, Account>,
    tokens: RwLock<HashMap<String, IssuedToken>>,
    token_ttl: Duration,
    failing: AtomicBool,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            tokens: RwLock::new(HashMap::new()),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            failing: AtomicBool::new(false),
        }
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime of newly issued access tokens
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Number of tokens currently held, expired or not
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Register an account that can log in with `email`/`password`
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        self.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: AuthUser::new(email),
            },
        );
        self
    }

    /// Make every subsequent call fail as if the provider were unreachable
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CredentialError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CredentialError::Unavailable("credential store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CredentialError> {
        self.check_available()?;
        let account = self
            .accounts
            .get(email)
            .filter(|a| a.password == password)
            .ok_or(CredentialError::InvalidCredentials)?;

        let now = Utc::now();
        let mut user = account.user.clone();
        user.last_sign_in_at = Some(now);

        let expires_at = now + self.token_ttl;
        let access_token = Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(
            access_token.clone(),
            IssuedToken { user: user.clone(), expires_at },
        );

        Ok(Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.token_ttl.num_seconds(),
            expires_at: Some(expires_at.timestamp()),
            refresh_token: Some(Uuid::new_v4().simple().to_string()),
            user,
        })
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, CredentialError> {
        self.check_available()?;
        let now = Utc::now();

        let mut tokens = self.tokens.write().await;
        tokens.retain(|_, issued| issued.expires_at > now);
        tokens
            .get(token)
            .map(|issued| issued.user.clone())
            .ok_or(CredentialError::InvalidToken)
    }

    async fn sign_out(&self, token: Option<&str>) -> Result<(), CredentialError> {
        self.check_available()?;
        let Some(token) = token else {
            return Ok(());
        };

        let mut tokens = self.tokens.write().await;
        if let Some(owner) = tokens.get(token).map(|issued| issued.user.id) {
            tokens.retain(|_, issued| issued.user.id != owner);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_issues_a_resolvable_token() {
        let store = MemoryCredentialStore::new().with_user("admin@example.com", "secret");
        let session = store.sign_in("admin@example.com", "secret").await.unwrap();
        let user = store.get_user(&session.access_token).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("admin@example.com"));
        assert_eq!(session.token_type, "bearer");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let store = MemoryCredentialStore::new().with_user("admin@example.com", "secret");
        assert!(matches!(
            store.sign_in("admin@example.com", "nope").await,
            Err(CredentialError::InvalidCredentials)
        ));
        assert!(matches!(
            store.sign_in("ghost@example.com", "secret").await,
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn sign_out_revokes_all_sessions_of_the_user() {
        let store = MemoryCredentialStore::new().with_user("admin@example.com", "secret");
        let first = store.sign_in("admin@example.com", "secret").await.unwrap();
        let second = store.sign_in("admin@example.com", "secret").await.unwrap();

        store.sign_out(Some(&first.access_token)).await.unwrap();
        assert!(matches!(store.get_user(&first.access_token).await, Err(CredentialError::InvalidToken)));
        assert!(matches!(store.get_user(&second.access_token).await, Err(CredentialError::InvalidToken)));
    }

    #[tokio::test]
    async fn session_advertises_the_configured_ttl() {
        let store = MemoryCredentialStore::new().with_user("admin@example.com", "secret");
        let session = store.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(session.expires_in, 3600);
        let expires_at = session.expires_at.unwrap();
        assert!(expires_at - Utc::now().timestamp() <= 3600);
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected_and_pruned() {
        let store = MemoryCredentialStore::new()
            .with_user("admin@example.com", "secret")
            .with_token_ttl(Duration::zero());
        let session = store.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(session.expires_in, 0);
        assert_eq!(store.token_count().await, 1);

        assert!(matches!(store.get_user(&session.access_token).await, Err(CredentialError::InvalidToken)));
        assert_eq!(store.token_count().await, 0);
    }

    #[tokio::test]
    async fn sign_out_without_token_is_a_no_op() {
        let store = MemoryCredentialStore::new();
        assert!(store.sign_out(None).await.is_ok());
    }
}
