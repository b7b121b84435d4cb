//! Admin authentication.
//!
//! Password login against Argon2id hashes, plus the signed bearer tokens
//! handed out on login.

mod error;
mod token;

pub use error::AuthError;
pub use token::{DEFAULT_TOKEN_TTL, TOKEN_PREFIX, TokenSigner};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use qaima_core::Email;

use crate::db::{MenuStore, RepositoryError};
use crate::models::{Admin, NewAdmin};

/// Minimum password length for new admins.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Admin authentication over a [`MenuStore`].
pub struct AuthService<'a> {
    store: &'a dyn MenuStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn MenuStore) -> Self {
        Self { store }
    }

    /// Check an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password does not match; a malformed email is reported the same way.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Admin, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let admin = self
            .store
            .find_admin_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &admin.password_hash)?;

        tracing::info!(admin_id = %admin.id, "Admin logged in");
        Ok(admin)
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AdminAlreadyExists` if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Admin, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.store
            .create_admin(&NewAdmin {
                email,
                password_hash,
                name: name.to_owned(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AdminAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_hash_is_argon2id_and_verifies() {
        let hash = hash_password("admin123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash).is_ok());
        assert!(verify_password("admin124", &hash).is_err());
    }

    #[tokio::test]
    async fn test_login_flow() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.create_admin("Admin@Restaurant.com", "مدير المطعم", "admin123")
            .await
            .unwrap();

        let admin = auth.login("admin@restaurant.com", "admin123").await.unwrap();
        assert_eq!(admin.name, "مدير المطعم");

        assert!(matches!(
            auth.login("admin@restaurant.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@restaurant.com", "admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("not-an-email", "admin123").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_create_admin_rejections() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.create_admin("a@restaurant.com", "A", "123").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.create_admin("bad", "A", "long-enough").await,
            Err(AuthError::InvalidEmail(_))
        ));

        auth.create_admin("a@restaurant.com", "A", "long-enough")
            .await
            .unwrap();
        assert!(matches!(
            auth.create_admin("A@restaurant.com", "B", "long-enough").await,
            Err(AuthError::AdminAlreadyExists)
        ));
    }
}
