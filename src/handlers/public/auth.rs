use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{AuthUser, CredentialError, Session};
use crate::error::ApiError;
use crate::middleware::{extract_bearer_token, ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: AuthUser,
    pub session: Session,
}

impl LoginRequest {
    fn credentials(&self) -> Result<(&str, &str), ApiError> {
        let email = self.email.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let password = self.password.as_deref().filter(|s| !s.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut field_errors = HashMap::new();
                if email.is_none() {
                    field_errors.insert("email".to_string(), "Campo obrigatório".to_string());
                }
                if password.is_none() {
                    field_errors.insert("password".to_string(), "Campo obrigatório".to_string());
                }
                Err(ApiError::validation_error("Email e senha são obrigatórios", Some(field_errors)))
            }
        }
    }
}

/// POST /auth/login - Exchange email/password for a session
///
/// Missing fields are a 400; wrong credentials are a 401.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let (email, password) = request.credentials()?;

    let session = state.credentials.sign_in(email, password).await.map_err(|e| {
        if matches!(e, CredentialError::InvalidCredentials) {
            tracing::warn!("Failed login for {}", email);
        }
        ApiError::from(e)
    })?;

    tracing::info!("Login for {}", email);
    Ok(ApiResponse::success(LoginResponse {
        user: session.user.clone(),
        session,
    })
    .with_message("Login realizado com sucesso"))
}

/// POST /auth/logout - Sign out
///
/// No token is required. When the caller presents one, every session of its
/// owner is revoked.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let token = extract_bearer_token(&headers);

    state.credentials.sign_out(token).await.map_err(|e| {
        tracing::error!("Erro no logout: {}", e);
        ApiError::internal_server_error("Erro ao fazer logout")
    })?;

    Ok(ApiResponse::message("Logout realizado com sucesso"))
}
