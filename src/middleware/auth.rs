use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::CredentialError;
use crate::error::ApiError;

/// Bearer authentication guard for protected routes.
///
/// No token in the `Authorization` header is a 401; a token the credential
/// store rejects is a 403. On success the resolved `AuthUser` is inserted into
/// the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Token de acesso requerido"))?
        .to_string();

    let user = state.credentials.get_user(&token).await.map_err(|e| {
        if matches!(e, CredentialError::InvalidToken) {
            tracing::warn!("Rejected bearer token for {} {}", request.method(), request.uri().path());
        }
        ApiError::from(e)
    })?;

    tracing::debug!("Authenticated {} for {}", user.email.as_deref().unwrap_or("unknown"), request.uri().path());

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Credential part of `Authorization: <scheme> <credential>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}
