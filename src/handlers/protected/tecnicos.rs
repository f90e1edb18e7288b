use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::database::{Technician, TechnicianPayload};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /tecnicos - Register a technician
///
/// Body: `{ "nome": "...", "telefone": "...", "ativo"?: bool }`.
/// 201 with the created record plus `message`; 400 on missing fields; 409
/// when the phone number is already registered.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TechnicianPayload>, JsonRejection>,
) -> ApiResult<Technician> {
    let Json(payload) = payload?;
    let technician = state.technicians.create(payload).await?;

    tracing::info!(
        "Technician {} created by {}",
        technician.id,
        user.email.as_deref().unwrap_or("unknown")
    );
    Ok(ApiResponse::created(technician).with_message("Técnico criado com sucesso"))
}

/// PUT /tecnicos/:id - Replace name, phone and active flag
///
/// An absent `ativo` re-activates the technician.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TechnicianPayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    state.technicians.update(&id, payload).await?;
    Ok(ApiResponse::message("Técnico atualizado com sucesso"))
}

/// DELETE /tecnicos/:id - Remove a technician permanently
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.technicians.delete(&id).await?;
    Ok(ApiResponse::message("Técnico deletado com sucesso"))
}
