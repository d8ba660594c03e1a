//! Sets inside a workout the caller owns.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::model::{SetRequest, WorkoutSet};
use crate::server::extract::{parse_id, require_id};
use crate::server::{ApiError, AppState, CurrentUser, JsonBody};
use crate::storage::SetChange;

fn set_ids(workout_id: &str, set_id: &str) -> Result<(i64, i64), ApiError> {
    parse_id(workout_id)
        .zip(parse_id(set_id))
        .ok_or_else(|| ApiError::bad_request("invalid ids"))
}

fn require_owned(state: &AppState, user_id: i64, workout_id: i64) -> Result<(), ApiError> {
    if state.with_storage(|storage| storage.owns_workout(user_id, workout_id))? {
        Ok(())
    } else {
        Err(ApiError::not_found("workout not found"))
    }
}

fn require_exercise(state: &AppState, exercise_id: i64) -> Result<(), ApiError> {
    if state.with_storage(|storage| storage.exercise_exists(exercise_id))? {
        Ok(())
    } else {
        Err(ApiError::not_found("exercise not found"))
    }
}

pub async fn add(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(workout_id): Path<String>,
    JsonBody(req): JsonBody<SetRequest>,
) -> Result<(StatusCode, Json<WorkoutSet>), ApiError> {
    let workout_id = require_id(&workout_id, "invalid workout id")?;
    require_owned(&state, current.user.id, workout_id)?;

    let (Some(exercise_id), Some(reps), Some(weight)) = (req.exercise_id, req.reps, req.weight)
    else {
        return Err(ApiError::bad_request("missing fields"));
    };
    if exercise_id <= 0 || reps <= 0 || weight <= 0.0 {
        return Err(ApiError::bad_request("invalid values"));
    }
    require_exercise(&state, exercise_id)?;

    let change = SetChange {
        exercise_id: Some(exercise_id),
        reps,
        weight,
    };
    let set = state.with_storage(|storage| storage.add_set(workout_id, &change))?;
    Ok((StatusCode::CREATED, Json(set)))
}

pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((workout_id, set_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<SetRequest>,
) -> Result<Json<WorkoutSet>, ApiError> {
    let (workout_id, set_id) = set_ids(&workout_id, &set_id)?;
    require_owned(&state, current.user.id, workout_id)?;

    let (Some(reps), Some(weight)) = (req.reps, req.weight) else {
        return Err(ApiError::bad_request("missing fields"));
    };
    if reps <= 0 || weight <= 0.0 || req.exercise_id.is_some_and(|id| id <= 0) {
        return Err(ApiError::bad_request("invalid values"));
    }
    if let Some(exercise_id) = req.exercise_id {
        require_exercise(&state, exercise_id)?;
    }

    let change = SetChange {
        exercise_id: req.exercise_id,
        reps,
        weight,
    };
    state
        .with_storage(|storage| storage.update_set(workout_id, set_id, &change))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("not found"))
}

pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((workout_id, set_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (workout_id, set_id) = set_ids(&workout_id, &set_id)?;
    require_owned(&state, current.user.id, workout_id)?;

    if state.with_storage(|storage| storage.delete_set(workout_id, set_id))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("not found"))
    }
}
