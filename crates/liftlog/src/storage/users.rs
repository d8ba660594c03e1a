//! Accounts and bearer-token sessions.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{format_timestamp, is_constraint_violation, truncate_to_secs, Storage};
use crate::error::{Error, Result};
use crate::model::{Role, User};

/// Fields for inserting an account.
#[derive(Debug, Clone, Copy)]
pub struct NewUser<'a> {
    /// Login email.
    pub email: &'a str,
    /// Encoded password hash.
    pub password_hash: &'a str,
    /// First name.
    pub name: &'a str,
    /// Last name.
    pub surname: &'a str,
    /// Account role.
    pub role: Role,
}

/// An account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The account.
    pub user: User,
    /// Stored hash, possibly a legacy plaintext value.
    pub password_hash: String,
}

/// Hex BLAKE3 digest of a bearer token, the form stored in `sessions`.
fn token_digest(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

impl Storage {
    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            role: row.get(2)?,
            name: row.get(3)?,
            surname: row.get(4)?,
        })
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the email is already registered, or an
    /// error if the database operation fails.
    pub fn create_user(&self, new: &NewUser<'_>) -> Result<User> {
        let inserted = self.conn.execute(
            r"
            INSERT INTO users (email, password_hash, name, surname, role)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![new.email, new.password_hash, new.name, new.surname, new.role],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => {
                return Err(Error::conflict("email already exists"));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn.last_insert_rowid();
        debug!(user_id = id, role = %new.role, "Created user");

        Ok(User {
            id,
            email: new.email.to_string(),
            role: new.role,
            name: new.name.to_string(),
            surname: new.surname.to_string(),
        })
    }

    /// Look up an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let found = self
            .conn
            .query_row(
                r"
                SELECT id, email, role, name, surname, password_hash
                FROM users WHERE email = ?1
                ",
                [email],
                |row| {
                    Ok(Credentials {
                        user: Self::row_to_user(row)?,
                        password_hash: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, role, name, surname FROM users WHERE id = ?1",
                [id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List every account ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, email, role, name, surname FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Replace the stored password hash of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user_id],
        )?;
        Ok(())
    }

    /// Whether at least one admin account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn has_admin(&self) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')",
            [],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Record a session for `token`, valid for `ttl`.
    ///
    /// Returns the expiry time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_session(&self, user_id: i64, token: &str, ttl: Duration) -> Result<DateTime<Utc>> {
        let expires_at = truncate_to_secs(Utc::now() + ttl);
        self.conn.execute(
            "INSERT INTO sessions (user_id, token_hash, expires_at) VALUES (?1, ?2, ?3)",
            params![user_id, token_digest(token), format_timestamp(expires_at)],
        )?;
        Ok(expires_at)
    }

    /// Resolve a bearer token to its account, if the session has not expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn session_user(&self, token: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                r"
                SELECT u.id, u.email, u.role, u.name, u.surname
                FROM sessions s JOIN users u ON u.id = s.user_id
                WHERE s.token_hash = ?1 AND s.expires_at > ?2
                ",
                params![token_digest(token), format_timestamp(Utc::now())],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Delete the session for `token`.
    ///
    /// Returns `true` if a session was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1", [token_digest(token)])?;
        Ok(affected > 0)
    }

    /// Delete every expired session.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_expired_sessions(&self) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [format_timestamp(Utc::now())],
        )?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support;

    #[test]
    fn test_create_and_get_user() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        assert!(user.id > 0);
        let fetched = storage.get_user(user.id).unwrap().unwrap();
        assert_eq!(fetched, user);
        assert!(storage.get_user(9999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_conflict() {
        let storage = test_support::storage();
        test_support::user(&storage, "ana@example.com", Role::Client);

        let err = storage
            .create_user(&NewUser {
                email: "ana@example.com",
                password_hash: "x",
                name: "Other",
                surname: "Person",
                role: Role::Admin,
            })
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "email already exists");
    }

    #[test]
    fn test_find_credentials() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        let creds = storage.find_credentials("ana@example.com").unwrap().unwrap();
        assert_eq!(creds.user, user);
        assert!(creds.password_hash.starts_with("pbkdf2$"));
        assert!(storage.find_credentials("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_list_users_ordered_by_id() {
        let storage = test_support::storage();
        let a = test_support::user(&storage, "a@example.com", Role::Admin);
        let b = test_support::user(&storage, "b@example.com", Role::Client);

        let users = storage.list_users().unwrap();
        assert_eq!(users.iter().map(|u| u.id).collect::<Vec<_>>(), [a.id, b.id]);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[test]
    fn test_set_password_hash() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        storage.set_password_hash(user.id, "new-hash").unwrap();
        let creds = storage.find_credentials("ana@example.com").unwrap().unwrap();
        assert_eq!(creds.password_hash, "new-hash");
    }

    #[test]
    fn test_has_admin() {
        let storage = test_support::storage();
        assert!(!storage.has_admin().unwrap());

        test_support::user(&storage, "c@example.com", Role::Client);
        assert!(!storage.has_admin().unwrap());

        test_support::user(&storage, "a@example.com", Role::Admin);
        assert!(storage.has_admin().unwrap());
    }

    #[test]
    fn test_session_lifecycle() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        let expires = storage.create_session(user.id, "tok", Duration::days(7)).unwrap();
        assert!(expires > Utc::now());

        let resolved = storage.session_user("tok").unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(storage.session_user("other").unwrap().is_none());

        assert!(storage.delete_session("tok").unwrap());
        assert!(!storage.delete_session("tok").unwrap());
        assert!(storage.session_user("tok").unwrap().is_none());
    }

    #[test]
    fn test_session_token_not_stored_in_clear() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);
        storage.create_session(user.id, "secret-token", Duration::days(1)).unwrap();

        let stored: String = storage
            .conn
            .query_row("SELECT token_hash FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_ne!(stored, "secret-token");
        assert_eq!(stored, token_digest("secret-token"));
    }

    #[test]
    fn test_expired_session_is_rejected_and_pruned() {
        let storage = test_support::storage();
        let user = test_support::user(&storage, "ana@example.com", Role::Client);

        storage.create_session(user.id, "old", Duration::days(-1)).unwrap();
        storage.create_session(user.id, "new", Duration::days(1)).unwrap();

        assert!(storage.session_user("old").unwrap().is_none());
        assert_eq!(storage.prune_expired_sessions().unwrap(), 1);
        assert!(storage.session_user("new").unwrap().is_some());
    }
}
