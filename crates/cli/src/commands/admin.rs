//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! qaima admin create -e admin@example.com -n "Admin Name" -p "s3cret-pass"
//! ```

use qaima_core::AdminId;
use qaima_web::db::MenuStore;
use qaima_web::services::auth::AuthService;

use super::{CliError, open_store};

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `CliError::Auth` for an invalid email, a short password or an
/// email that is already registered.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<AdminId, CliError> {
    let store = open_store().await?;

    tracing::info!("Creating admin user: {}", email);
    let admin = AuthService::new(store.as_ref())
        .create_admin(email, name, password)
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        admin.id,
        admin.email
    );

    store.close().await;
    Ok(admin.id)
}
