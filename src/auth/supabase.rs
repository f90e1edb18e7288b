use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use url::Url;

use super::{AuthUser, CredentialError, CredentialStore, Session};
use crate::config::CredentialConfig;

/// Client for the Supabase GoTrue REST API (`/auth/v1/*`)
#[derive(Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: Url,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &CredentialConfig) -> Result<Self, CredentialError> {
        let raw_url = config
            .url
            .as_deref()
            .ok_or_else(|| CredentialError::Misconfigured("SUPABASE_URL is not set".to_string()))?;
        let anon_key = config
            .anon_key
            .clone()
            .ok_or_else(|| CredentialError::Misconfigured("SUPABASE_ANON_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CredentialError::Misconfigured(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(raw_url)?,
            anon_key,
        })
    }

    /// Ensure the base path ends with `/` so `Url::join` appends instead of
    /// replacing the last segment
    fn normalize_base(raw: &str) -> Result<Url, CredentialError> {
        let mut url = Url::parse(raw).map_err(|_| CredentialError::Misconfigured(format!("invalid SUPABASE_URL: {}", raw)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CredentialError> {
        self.base_url
            .join(path)
            .map_err(|e| CredentialError::Misconfigured(e.to_string()))
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, CredentialError> {
        builder.send().await.map_err(|e| {
            tracing::error!("Credential store request failed: {}", e);
            CredentialError::Unavailable(e.to_string())
        })
    }
}

#[async_trait]
impl CredentialStore for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, CredentialError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = Self::send(
            self.request(self.client.post(url))
                .json(&json!({ "email": email, "password": password })),
        )
        .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(CredentialError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(CredentialError::Unavailable(format!("login returned {}", status)));
        }

        response
            .json::<Session>()
            .await
            .map_err(|e| CredentialError::UnexpectedResponse(e.to_string()))
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, CredentialError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = Self::send(self.request(self.client.get(url)).bearer_auth(token)).await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(CredentialError::InvalidToken);
        }
        if !status.is_success() {
            return Err(CredentialError::Unavailable(format!("user lookup returned {}", status)));
        }

        response
            .json::<AuthUser>()
            .await
            .map_err(|e| CredentialError::UnexpectedResponse(e.to_string()))
    }

    async fn sign_out(&self, token: Option<&str>) -> Result<(), CredentialError> {
        let Some(token) = token else {
            return Ok(());
        };

        let mut url = self.endpoint("auth/v1/logout")?;
        url.query_pairs_mut().append_pair("scope", "global");

        let response = Self::send(self.request(self.client.post(url)).bearer_auth(token)).await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            // Session already gone: nothing left to sign out
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            s => Err(CredentialError::Unavailable(format!("logout returned {}", s))),
        }
    }
}
