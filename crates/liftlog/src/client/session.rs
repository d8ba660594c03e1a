//! Login state on top of [`ApiClient`] and [`TokenStore`].

use tracing::{debug, warn};

use super::{ApiClient, TokenStore};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{AuthResponse, SignupRequest, User};

/// An API client whose token is persisted between invocations.
#[derive(Debug, Clone)]
pub struct Session {
    api: ApiClient,
    tokens: TokenStore,
}

impl Session {
    /// Pair a client with a token store, loading any stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file exists but cannot be read.
    pub fn new(mut api: ApiClient, tokens: TokenStore) -> Result<Self> {
        api.set_token(tokens.get()?);
        Ok(Self { api, tokens })
    }

    /// Build a session from the `[client]` section of a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built or the token cannot be read.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            ApiClient::from_config(config)?,
            TokenStore::new(config.token_path()),
        )
    }

    /// The underlying client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Whether a token is currently stored.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.api.token().is_some()
    }

    fn remember(&mut self, token: &str) -> Result<()> {
        self.tokens.set(token)?;
        self.api.set_token(Some(token.to_string()));
        Ok(())
    }

    fn forget(&mut self) -> Result<()> {
        self.api.set_token(None);
        self.tokens.clear()
    }

    /// Log in and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns an error if the login is rejected or the token cannot be saved.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse> {
        let auth = self.api.login(email, password).await?;
        self.remember(&auth.token)?;
        Ok(auth)
    }

    /// Create an account, which also logs in, and store the returned token.
    ///
    /// # Errors
    ///
    /// Returns an error if the signup is rejected or the token cannot be saved.
    pub async fn signup(&mut self, req: &SignupRequest) -> Result<AuthResponse> {
        let auth = self.api.signup(req).await?;
        self.remember(&auth.token)?;
        Ok(auth)
    }

    /// End the session on the server and forget the local token.
    ///
    /// The local token is cleared even when the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the server error, if any, after the token has been cleared.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.api.logout().await;
        if let Err(e) = &result {
            warn!(error = %e, "Server logout failed; clearing local token anyway");
        }
        self.forget()?;
        result
    }

    /// Resolve the logged-in account.
    ///
    /// Without a stored token this fails with [`Error::NotLoggedIn`]. When the
    /// server rejects the token it is cleared and the same error is returned.
    /// An unreachable server leaves the token in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] or [`Error::Unreachable`].
    pub async fn ensure_user(&mut self) -> Result<User> {
        if !self.has_token() {
            return Err(Error::NotLoggedIn);
        }
        match self.api.me().await {
            Ok(user) => Ok(user),
            Err(e @ Error::Unreachable { .. }) => Err(e),
            Err(e) => {
                debug!(error = %e, "Stored session rejected");
                self.forget()?;
                Err(Error::NotLoggedIn)
            }
        }
    }

    /// Resolve the logged-in account and require the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdminOnly`] for non-admins, or any error of
    /// [`Session::ensure_user`].
    pub async fn ensure_admin(&mut self) -> Result<User> {
        let user = self.ensure_user().await?;
        if !user.role.is_admin() {
            return Err(Error::AdminOnly);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        Session::new(api, TokenStore::new(dir.path().join("token"))).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_user_without_token() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert!(!session.has_token());
        assert!(matches!(session.ensure_user().await, Err(Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_stored_token_is_loaded() {
        let dir = TempDir::new().unwrap();
        TokenStore::new(dir.path().join("token")).set("abc").unwrap();

        let session = session(&dir);
        assert_eq!(session.api().token(), Some("abc"));
    }

    #[tokio::test]
    async fn test_unreachable_keeps_token() {
        let dir = TempDir::new().unwrap();
        TokenStore::new(dir.path().join("token")).set("abc").unwrap();
        let mut session = session(&dir);

        let err = session.ensure_user().await.unwrap_err();
        assert!(matches!(err, Error::Unreachable { .. }));
        assert!(session.has_token());
    }

    #[tokio::test]
    async fn test_logout_clears_token_when_server_fails() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.set("abc").unwrap();
        let mut session = session(&dir);

        assert!(session.logout().await.is_err());
        assert!(!session.has_token());
        assert_eq!(store.get().unwrap(), None);
    }
}
