//! Typed HTTP client for the liftlog REST API.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    AuthResponse, DailyVolume, Exercise, ExerciseRequest, LoginRequest, MeResponse,
    NewUserRequest, PersonalRecord, SetRequest, SignupRequest, User, Workout, WorkoutSet,
    WorkoutSummary,
};

/// Client for one liftlog server.
///
/// Every call is a single request; nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a client from the `[client]` section of a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.client.base_url.clone(), config.request_timeout())
    }

    /// The server this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token sent on authenticated calls.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// `204 No Content` and empty bodies yield `None`. A body that is not
    /// JSON is treated as absent.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingToken`] if `auth` is set and there is no token; no
    ///   request is sent.
    /// - [`Error::Unreachable`] if the server cannot be reached.
    /// - [`Error::Api`] for a non-success status, carrying the body's `error`
    ///   field, else the raw body text, else `HTTP <status>`.
    pub async fn api(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: bool,
    ) -> Result<Option<Value>> {
        let mut request = self
            .http
            .request(method.clone(), format!("{}{path}", self.base_url));

        if auth {
            let token = self.token.as_deref().ok_or(Error::MissingToken)?;
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        debug!(%method, path, "API request");
        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                Error::Http(e)
            } else {
                debug!(error = %e, "Transport failure");
                Error::Unreachable {
                    url: self.base_url.clone(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        let data: Option<Value> = if text.is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if !status.is_success() {
            return Err(Error::api(status.as_u16(), failure_message(status, data.as_ref(), &text)));
        }
        Ok(data)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: bool,
    ) -> Result<T> {
        let data = self.api(method, path, body, auth).await?;
        Ok(serde_json::from_value(data.unwrap_or(Value::Null))?)
    }

    async fn call_no_content(&self, method: Method, path: &str, auth: bool) -> Result<()> {
        self.api(method, path, None, auth).await?;
        Ok(())
    }

    fn json_body(body: &impl Serialize) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(body)?))
    }

    // === Account ===

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn health(&self) -> Result<Value> {
        self.call(Method::GET, "/health", None, false).await
    }

    /// `POST /login`. Does not store the returned token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.call(Method::POST, "/login", Self::json_body(&body)?, false)
            .await
    }

    /// `POST /signup`. Does not store the returned token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the signup is rejected.
    pub async fn signup(&self, req: &SignupRequest) -> Result<AuthResponse> {
        self.call(Method::POST, "/signup", Self::json_body(req)?, false)
            .await
    }

    /// `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no token or the session is rejected.
    pub async fn me(&self) -> Result<User> {
        let me: MeResponse = self.call(Method::GET, "/me", None, true).await?;
        Ok(me.user)
    }

    /// `POST /logout`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no token or the request fails.
    pub async fn logout(&self) -> Result<()> {
        self.call_no_content(Method::POST, "/logout", true).await
    }

    // === Exercises ===

    /// `GET /exercises`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        self.call(Method::GET, "/exercises", None, false).await
    }

    /// `GET /exercises/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the exercise does not exist.
    pub async fn get_exercise(&self, id: i64) -> Result<Exercise> {
        self.call(Method::GET, &format!("/exercises/{id}"), None, false)
            .await
    }

    /// `POST /exercises` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub async fn create_exercise(&self, name: &str) -> Result<Exercise> {
        let body = ExerciseRequest {
            name: Some(name.to_string()),
        };
        self.call(Method::POST, "/exercises", Self::json_body(&body)?, true)
            .await
    }

    /// `PUT /exercises/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub async fn update_exercise(&self, id: i64, name: &str) -> Result<Exercise> {
        let body = ExerciseRequest {
            name: Some(name.to_string()),
        };
        self.call(
            Method::PUT,
            &format!("/exercises/{id}"),
            Self::json_body(&body)?,
            true,
        )
        .await
    }

    /// `DELETE /exercises/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub async fn delete_exercise(&self, id: i64) -> Result<()> {
        self.call_no_content(Method::DELETE, &format!("/exercises/{id}"), true)
            .await
    }

    // === Workouts ===

    /// `GET /workouts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_workouts(&self) -> Result<Vec<WorkoutSummary>> {
        self.call(Method::GET, "/workouts", None, true).await
    }

    /// `POST /workouts`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_workout(&self) -> Result<WorkoutSummary> {
        self.call(Method::POST, "/workouts", None, true).await
    }

    /// `GET /workouts/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the workout is not found.
    pub async fn get_workout(&self, id: i64) -> Result<Workout> {
        self.call(Method::GET, &format!("/workouts/{id}"), None, true)
            .await
    }

    /// `DELETE /workouts/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the workout is not found.
    pub async fn delete_workout(&self, id: i64) -> Result<()> {
        self.call_no_content(Method::DELETE, &format!("/workouts/{id}"), true)
            .await
    }

    // === Sets ===

    /// `POST /workouts/{id}/sets`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn add_set(&self, workout_id: i64, set: &SetRequest) -> Result<WorkoutSet> {
        self.call(
            Method::POST,
            &format!("/workouts/{workout_id}/sets"),
            Self::json_body(set)?,
            true,
        )
        .await
    }

    /// `PUT /workouts/{id}/sets/{set_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn update_set(
        &self,
        workout_id: i64,
        set_id: i64,
        set: &SetRequest,
    ) -> Result<WorkoutSet> {
        self.call(
            Method::PUT,
            &format!("/workouts/{workout_id}/sets/{set_id}"),
            Self::json_body(set)?,
            true,
        )
        .await
    }

    /// `DELETE /workouts/{id}/sets/{set_id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the set is not found.
    pub async fn delete_set(&self, workout_id: i64, set_id: i64) -> Result<()> {
        self.call_no_content(
            Method::DELETE,
            &format!("/workouts/{workout_id}/sets/{set_id}"),
            true,
        )
        .await
    }

    // === Stats ===

    /// `GET /stats/volume`, optionally with `?days=N`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn volume(&self, days: Option<u32>) -> Result<Vec<DailyVolume>> {
        let path = match days {
            Some(days) => format!("/stats/volume?days={days}"),
            None => "/stats/volume".to_string(),
        };
        self.call(Method::GET, &path, None, true).await
    }

    /// `GET /stats/prs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn personal_records(&self) -> Result<Vec<PersonalRecord>> {
        self.call(Method::GET, "/stats/prs", None, true).await
    }

    // === Admin ===

    /// `GET /admin/users` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.call(Method::GET, "/admin/users", None, true).await
    }

    /// `POST /admin/users` (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is refused.
    pub async fn create_user(&self, req: &NewUserRequest) -> Result<User> {
        self.call(Method::POST, "/admin/users", Self::json_body(req)?, true)
            .await
    }
}

/// Message for a failed response: the JSON `error` field, else the raw body,
/// else `HTTP <status>`.
fn failure_message(status: StatusCode, data: Option<&Value>, text: &str) -> String {
    if let Some(message) = data
        .and_then(|d| d.get("error"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        return message.to_string();
    }
    if !text.is_empty() {
        return text.to_string();
    }
    format!("HTTP {}", status.as_u16())
}
