//! Database migration command.
//!
//! Migrations live in `crates/web/migrations/` and are embedded at build
//! time.

use secrecy::ExposeSecret;

use qaima_web::db::{self, MEMORY_URL_PREFIX};

use super::{CliError, database_url};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `CliError::RequiresPostgres` for a `memory:` URL, or the
/// connection/migration error.
pub async fn run() -> Result<(), CliError> {
    let url = database_url()?;
    if url.expose_secret().starts_with(MEMORY_URL_PREFIX) {
        return Err(CliError::RequiresPostgres("migrate"));
    }

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    pool.close().await;
    tracing::info!("Migrations complete!");
    Ok(())
}
