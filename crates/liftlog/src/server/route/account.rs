//! Health, login, signup, logout and the current account.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::info;

use crate::model::{AuthResponse, LoginRequest, MeResponse, Role, SignupRequest};
use crate::password;
use crate::server::{ApiError, AppState, CurrentUser, JsonBody};
use crate::storage::NewUser;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::bad_request("missing email/password"));
    };

    let creds = state
        .with_storage(|storage| storage.find_credentials(&email))?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let verified = state
        .verify_password(password.clone(), creds.password_hash.clone())
        .await?;
    if !verified {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    if !password::is_pbkdf2(&creds.password_hash) {
        let upgraded = state.hash_password(password).await?;
        state.with_storage(|storage| storage.set_password_hash(creds.user.id, &upgraded))?;
        info!(user_id = creds.user.id, "Upgraded legacy password hash");
    }

    let token = state.start_session(creds.user.id)?;
    info!(user_id = creds.user.id, "Login");
    Ok(Json(AuthResponse {
        token,
        user: creds.user,
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (Some(email), Some(password), Some(name), Some(surname)) =
        (req.email, req.password, req.name, req.surname)
    else {
        return Err(ApiError::bad_request("missing fields"));
    };

    if email.len() < 3 || password.is_empty() || name.is_empty() || surname.is_empty() {
        return Err(ApiError::bad_request("invalid values"));
    }

    let password_hash = state.hash_password(password).await?;
    let user = state
        .with_storage(|storage| {
            storage.create_user(&NewUser {
                email: &email,
                password_hash: &password_hash,
                name: &name,
                surname: &surname,
                role: Role::Client,
            })
        })
        .map_err(|e| {
            if e.status() == StatusCode::CONFLICT {
                ApiError::bad_request("signup failed (email already exists?)")
            } else {
                e
            }
        })?;

    let token = state.start_session(user.id)?;
    info!(user_id = user.id, "Signup");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<StatusCode, ApiError> {
    state.with_storage(|storage| storage.delete_session(&current.token))?;
    info!(user_id = current.user.id, "Logout");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user: current.user })
}
