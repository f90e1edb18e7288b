use axum::{Extension, Json};
use serde::Serialize;

use crate::auth::AuthUser;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
}

/// GET /auth/me - Identity behind the presented bearer token
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<MeResponse> {
    Json(MeResponse { user })
}
