//! REST server for liftlog.
//!
//! An axum application over a single `SQLite` connection. Handlers lock the
//! connection only for the duration of synchronous storage calls; password
//! hashing runs on the blocking pool.

mod auth;
mod error;
mod extract;
mod route;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Role;
use crate::password::{self, PasswordHasher};
use crate::storage::{NewUser, Storage};

pub use auth::{AdminUser, CurrentUser};
pub use error::ApiError;
pub use extract::{JsonBody, QueryParams};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
    hasher: PasswordHasher,
    session_ttl: chrono::Duration,
}

impl AppState {
    /// Wrap an open storage with the given hashing cost and session lifetime.
    #[must_use]
    pub fn new(storage: Storage, hasher: PasswordHasher, session_ttl: chrono::Duration) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            hasher,
            session_ttl,
        }
    }

    /// Build state from the `[auth]` section of a configuration.
    #[must_use]
    pub fn from_config(storage: Storage, config: &Config) -> Self {
        Self::new(
            storage,
            PasswordHasher::new(config.auth.pbkdf2_iterations),
            config.session_ttl(),
        )
    }

    fn lock(&self) -> Result<MutexGuard<'_, Storage>> {
        self.storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))
    }

    /// Run a storage call, mapping its failure to a response.
    pub(crate) fn with_storage<T>(
        &self,
        f: impl FnOnce(&Storage) -> Result<T>,
    ) -> std::result::Result<T, ApiError> {
        let storage = self.lock()?;
        Ok(f(&storage)?)
    }

    /// Hash a password off the async executor.
    pub(crate) async fn hash_password(&self, password: String) -> std::result::Result<String, ApiError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::internal(&e))?
            .map_err(|e| ApiError::internal(&e))
    }

    /// Verify a password off the async executor.
    pub(crate) async fn verify_password(
        &self,
        password: String,
        stored: String,
    ) -> std::result::Result<bool, ApiError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| ApiError::internal(&e))
    }

    /// Open a session for `user_id` and return its bearer token.
    pub(crate) fn start_session(&self, user_id: i64) -> std::result::Result<String, ApiError> {
        let token = password::generate_token().map_err(|e| ApiError::internal(&e))?;
        self.with_storage(|storage| storage.create_session(user_id, &token, self.session_ttl))?;
        Ok(token)
    }

    /// Create the default admin account when no admin exists yet.
    ///
    /// Returns `true` if an account was created.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or the database operation fails.
    pub fn seed_admin(&self, email: &str, admin_password: &str) -> Result<bool> {
        let storage = self.lock()?;
        if storage.has_admin()? {
            return Ok(false);
        }

        let password_hash = self.hasher.hash(admin_password)?;
        let created = storage.create_user(&NewUser {
            email,
            password_hash: &password_hash,
            name: "Admin",
            surname: "System",
            role: Role::Admin,
        });

        match created {
            Ok(user) => {
                info!(user_id = user.id, email, "Seeded default admin");
                Ok(true)
            }
            Err(e) if e.is_conflict() => {
                warn!(email, "Cannot seed admin: email belongs to a non-admin account");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove expired sessions, returning how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_sessions(&self) -> Result<usize> {
        self.lock()?.prune_expired_sessions()
    }
}

/// Build the application router.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    route::router()
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve requests on an already bound listener until shutdown.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve_on(listener: TcpListener, router: Router) -> Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Open storage, prepare it and serve on the configured address.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &Config) -> Result<()> {
    let db_path = config.database_path();
    let storage = Storage::open(&db_path)?;
    let state = AppState::from_config(storage, config);

    let pruned = state.prune_sessions()?;
    if pruned > 0 {
        info!(pruned, "Removed expired sessions");
    }
    if config.auth.seed_admin {
        state.seed_admin(&config.auth.admin_email, &config.auth.admin_password)?;
    }

    let listener = TcpListener::bind(config.server.bind.as_str()).await?;
    let addr = listener.local_addr()?;
    info!("Listening on http://{addr}");

    serve_on(listener, build_router(state, config.server.max_body_bytes)).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
