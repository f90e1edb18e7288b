use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::Technician;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /tecnicos - All technicians, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Technician>> {
    let technicians = state.technicians.list().await?;
    Ok(ApiResponse::success(technicians))
}

/// GET /tecnicos/:id - Single technician or 404
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Technician> {
    let technician = state.technicians.get(&id).await?;
    Ok(ApiResponse::success(technician))
}
