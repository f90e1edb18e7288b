use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::database::DatabaseError;
use crate::services::Verification;

/// GET /verificar-tecnico/:telefone - Chatbot access check
///
/// Authorized (200):
/// ```json
/// { "autorizado": true, "tecnico": { "nome": "Ana", "telefone": "11999990000" },
///   "message": "✅ Acesso liberado! ...", "status": 200 }
/// ```
/// Denied (205 unless configured otherwise):
/// ```json
/// { "autorizado": false, "message": "❌ Acesso negado! ...", "status": 205 }
/// ```
/// A record store failure is a 500, never a denial.
pub async fn verificar_tecnico(State(state): State<AppState>, Path(telefone): Path<String>) -> Response {
    let result = state.checker.check_technician(&telefone).await;
    verification_response(result, state.denied_status)
}

pub fn verification_response(result: Result<Verification, DatabaseError>, denied_status: StatusCode) -> Response {
    match result {
        Ok(verification) => {
            let message = verification.message();
            match verification {
                Verification::Authorized(tecnico) => (
                    StatusCode::OK,
                    Json(json!({
                        "autorizado": true,
                        "tecnico": tecnico,
                        "message": message,
                        "status": StatusCode::OK.as_u16()
                    })),
                )
                    .into_response(),
                Verification::Denied => (
                    denied_status,
                    Json(json!({
                        "autorizado": false,
                        "message": message,
                        "status": denied_status.as_u16()
                    })),
                )
                    .into_response(),
            }
        }
        Err(e) => {
            tracing::error!("Erro ao verificar técnico: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Erro interno do servidor",
                    "message": "⚠️ Erro temporário no sistema. Tente novamente em alguns instantes.",
                    "status": 500
                })),
            )
                .into_response()
        }
    }
}
