//! The REST route table.
//!
//! Unknown paths and unsupported methods on known paths both answer
//! `404 {"error": "not found"}`.

use axum::routing::{get, post, put};
use axum::Router;

use super::{ApiError, AppState};

mod account;
mod admin;
mod exercises;
mod sets;
mod stats;
mod workouts;

pub(super) fn router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/health", get(account::health))
        .route("/login", post(account::login))
        .route("/signup", post(account::signup))
        .route("/logout", post(account::logout))
        .route("/me", get(account::me))
        .route("/exercises", get(exercises::list).post(exercises::create))
        .route(
            "/exercises/{id}",
            get(exercises::show)
                .put(exercises::update)
                .delete(exercises::delete),
        )
        .route("/workouts", get(workouts::list).post(workouts::create))
        .route(
            "/workouts/{id}",
            get(workouts::show)
                .put(workouts::update)
                .delete(workouts::delete),
        )
        .route("/workouts/{id}/sets", post(sets::add))
        .route(
            "/workouts/{id}/sets/{set_id}",
            put(sets::update).delete(sets::delete),
        )
        .route("/stats/volume", get(stats::volume))
        .route("/stats/prs", get(stats::prs))
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .method_not_allowed_fallback(fallback)
        .fallback(fallback)
}

async fn fallback() -> ApiError {
    ApiError::not_found("not found")
}
