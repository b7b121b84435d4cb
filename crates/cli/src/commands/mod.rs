//! Subcommand implementations.

pub mod admin;
pub mod cleanup;
pub mod migrate;
pub mod seed;
pub mod verify;

use secrecy::SecretString;
use thiserror::Error;

use qaima_web::config::{self, ConfigError};
use qaima_web::db::{self, MenuStore, RepositoryError, SharedStore};
use qaima_web::services::auth::AuthError;
use qaima_web::services::seed::SeedError;

/// Environment variable holding the store URL.
pub const DATABASE_URL_VAR: &str = "QAIMA_DATABASE_URL";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Default data could not be written.
    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    /// Admin could not be created.
    #[error("Admin error: {0}")]
    Auth(#[from] AuthError),

    /// The command needs `PostgreSQL`.
    #[error("{0} requires a PostgreSQL database URL")]
    RequiresPostgres(&'static str),
}

/// Load `.env` and read the store URL.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();
    Ok(config::get_database_url(DATABASE_URL_VAR)?)
}

/// Open the configured store and check it is reachable.
async fn open_store() -> Result<SharedStore, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to store...");
    let store = db::open_store(&url).await?;
    store.ping().await?;
    Ok(store)
}
