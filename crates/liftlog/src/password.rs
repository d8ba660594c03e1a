//! Password hashing and session token generation.
//!
//! Passwords are stored as `pbkdf2$sha256$<iterations>$<salt_hex>$<dk_hex>`
//! using PBKDF2-HMAC-SHA256 with a 16-byte random salt and a 32-byte derived
//! key. Stored values without the `pbkdf2$` prefix are legacy plaintext
//! passwords; they still verify, and the caller is expected to re-hash them
//! after a successful login.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const TOKEN_LEN: usize = 32;
const PREFIX: &str = "pbkdf2$sha256$";

/// Hashes and verifies passwords with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    /// Create a hasher that derives keys with `iterations` rounds.
    #[must_use]
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if the system random source fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;

        let key = derive(password, &salt, self.iterations);
        Ok(format!(
            "{PREFIX}{}${}${}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        ))
    }

    /// Check a password against a stored value.
    ///
    /// PBKDF2 values are checked with the iteration count they were created
    /// with. Anything else is compared as legacy plaintext. Malformed PBKDF2
    /// values never verify.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        if !is_pbkdf2(stored) {
            return bool::from(password.as_bytes().ct_eq(stored.as_bytes()));
        }

        let Some((iterations, salt, expected)) = parse(stored) else {
            return false;
        };
        let key = derive(password, &salt, iterations);
        bool::from(key.as_slice().ct_eq(expected.as_slice()))
    }
}

/// Whether a stored value is a PBKDF2 hash rather than a legacy plaintext password.
#[must_use]
pub fn is_pbkdf2(stored: &str) -> bool {
    stored.starts_with(PREFIX)
}

/// Generate a new session token: 32 random bytes as 64 hex characters.
///
/// # Errors
///
/// Returns an error if the system random source fails.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::internal(format!("random source failed: {e}")))?;
    Ok(hex::encode(bytes))
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn parse(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let rest = stored.strip_prefix(PREFIX)?;
    let mut parts = rest.split('$');
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let key = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || iterations == 0 || salt.is_empty() || key.len() != KEY_LEN {
        return None;
    }
    Some((iterations, salt, key))
}
