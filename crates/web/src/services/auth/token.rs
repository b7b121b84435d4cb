//! Signed, expiring admin bearer tokens.
//!
//! Format: `admin-token-<admin_id>.<expires_unix>.<hex hmac>`, where the MAC
//! is HMAC-SHA256 over `<admin_id>.<expires_unix>`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use qaima_core::AdminId;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Prefix every admin token starts with.
pub const TOKEN_PREFIX: &str = "admin-token-";

/// Default token lifetime (12 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Issues and verifies admin tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer with the given secret and token lifetime.
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Issue a token for `admin_id`, valid from `now` for the signer's TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the MAC cannot be keyed.
    pub fn issue(&self, admin_id: AdminId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires = now.timestamp().saturating_add(ttl);
        let payload = format!("{admin_id}.{expires}");

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{TOKEN_PREFIX}{payload}.{signature}"))
    }

    /// Verify `token` at time `now` and return the admin it was issued to.
    ///
    /// The signature is checked before the expiry, in constant time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed or the
    /// signature does not match, and `AuthError::TokenExpired` if it is past
    /// its expiry.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AdminId, AuthError> {
        let body = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(AuthError::InvalidToken)?;

        let (payload, signature) = body.rsplit_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = hex::decode(signature).map_err(|_| AuthError::InvalidToken)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let (admin_id, expires) = payload.split_once('.').ok_or(AuthError::InvalidToken)?;
        let admin_id: AdminId = admin_id.parse().map_err(|_| AuthError::InvalidToken)?;
        let expires: i64 = expires.parse().map_err(|_| AuthError::InvalidToken)?;

        if now.timestamp() >= expires {
            return Err(AuthError::TokenExpired);
        }

        Ok(admin_id)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
