//! The exercise catalogue. Reads are public, writes need an admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::model::{Exercise, ExerciseRequest};
use crate::server::extract::{non_blank, require_id};
use crate::server::{AdminUser, ApiError, AppState, JsonBody};

fn exercise_name(req: ExerciseRequest) -> Result<String, ApiError> {
    non_blank(req.name)
        .map(|name| name.trim().to_string())
        .ok_or_else(|| ApiError::bad_request("invalid json"))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Exercise>>, ApiError> {
    let exercises = state.with_storage(|storage| storage.list_exercises())?;
    Ok(Json(exercises))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Exercise>, ApiError> {
    let id = require_id(&id, "invalid id")?;
    state
        .with_storage(|storage| storage.get_exercise(id))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("not found"))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    JsonBody(req): JsonBody<ExerciseRequest>,
) -> Result<(StatusCode, Json<Exercise>), ApiError> {
    let name = exercise_name(req)?;
    let exercise = state.with_storage(|storage| storage.create_exercise(&name))?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ExerciseRequest>,
) -> Result<Json<Exercise>, ApiError> {
    let id = require_id(&id, "invalid id")?;
    let name = exercise_name(req)?;
    state
        .with_storage(|storage| storage.rename_exercise(id, &name))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("not found"))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = require_id(&id, "invalid id")?;
    if state.with_storage(|storage| storage.delete_exercise(id))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("not found"))
    }
}
