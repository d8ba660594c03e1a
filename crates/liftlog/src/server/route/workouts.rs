//! A user's own workouts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::model::{Workout, WorkoutSummary};
use crate::server::extract::require_id;
use crate::server::{ApiError, AppState, CurrentUser};

pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<WorkoutSummary>>, ApiError> {
    let workouts = state.with_storage(|storage| storage.list_workouts(current.user.id))?;
    Ok(Json(workouts))
}

pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<(StatusCode, Json<WorkoutSummary>), ApiError> {
    let workout = state.with_storage(|storage| storage.create_workout(current.user.id))?;
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn show(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Workout>, ApiError> {
    let id = require_id(&id, "invalid id")?;
    state
        .with_storage(|storage| storage.get_workout(current.user.id, id))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("not found"))
}

/// Workouts carry no editable fields of their own.
pub async fn update(_current: CurrentUser) -> ApiError {
    ApiError::new(StatusCode::NOT_IMPLEMENTED, "not implemented")
}

pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = require_id(&id, "invalid id")?;
    if state.with_storage(|storage| storage.delete_workout(current.user.id, id))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("not found"))
    }
}
