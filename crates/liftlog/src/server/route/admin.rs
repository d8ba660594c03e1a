//! Account management for admins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::model::{NewUserRequest, Role, User};
use crate::server::{AdminUser, ApiError, AppState, JsonBody};
use crate::storage::NewUser;

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.with_storage(|storage| storage.list_users())?;
    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let (Some(email), Some(password), Some(name), Some(surname), Some(role)) =
        (req.email, req.password, req.name, req.surname, req.role)
    else {
        return Err(ApiError::bad_request("missing fields"));
    };
    let role: Role = role
        .parse()
        .map_err(|_| ApiError::bad_request("invalid role"))?;

    let password_hash = state.hash_password(password).await?;
    let user = state
        .with_storage(|storage| {
            storage.create_user(&NewUser {
                email: &email,
                password_hash: &password_hash,
                name: &name,
                surname: &surname,
                role,
            })
        })
        .map_err(|e| {
            if e.status() == StatusCode::CONFLICT {
                ApiError::bad_request("insert failed (email already exists?)")
            } else {
                e
            }
        })?;

    info!(admin_id = admin.id, user_id = user.id, role = %user.role, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}
