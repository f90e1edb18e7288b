use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - Service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let base = state.base_path.as_str();

    Json(json!({
        "name": "Tecnicos API",
        "version": version,
        "description": "Whitelist of technicians authorized to use the chatbot",
        "timestamp": chrono::Utc::now(),
        "endpoints": {
            "verificar": format!("{base}/verificar-tecnico/:telefone (public)"),
            "tecnicos": format!("{base}/tecnicos[/:id] (GET public, POST/PUT/DELETE protected)"),
            "auth": format!("{base}/auth/login, {base}/auth/logout (public), {base}/auth/me (protected)"),
            "roles": format!("{base}/roles (public)"),
            "health": "/health (public)",
        }
    }))
}

/// GET /health - Liveness plus a record store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Rota não encontrada")
}
