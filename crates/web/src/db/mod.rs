//! Persistent store for the menu.
//!
//! # Tables (`PostgreSQL` schema `menu`)
//!
//! - `settings` - Restaurant settings (one logical row)
//! - `category` - Menu categories, `sort_order` drives display order
//! - `menu_item` - Dishes, `category_id` references `category` (no cascade)
//! - `admin` - Admin accounts, unique on `email`
//!
//! Deleting a category that still has items is a foreign-key violation at
//! the store level; callers remove the items first (see
//! `services::catalog::delete_category`).
//!
//! # Implementations
//!
//! - [`PgMenuStore`] - `sqlx` over `PostgreSQL`
//! - [`MemoryStore`] - in-process store with the same constraints, selected
//!   with `QAIMA_DATABASE_URL=memory:` and used throughout the tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p qaima-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use qaima_core::{AdminId, CategoryId, Email, MenuItemId, SettingsId};

use crate::models::{
    Admin, Category, CategoryUpdate, MenuItem, NewAdmin, NewCategory, NewMenuItem,
    RestaurantSettings, SettingsFields,
};

pub use memory::MemoryStore;
pub use postgres::PgMenuStore;

/// URL prefix that selects the in-memory store.
pub const MEMORY_URL_PREFIX: &str = "memory:";

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., admin email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A record references a row that does not exist, or a row is still
    /// referenced.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),
}

/// Row counts for the four record types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub settings: i64,
    pub categories: i64,
    pub items: i64,
    pub admins: i64,
}

impl StoreCounts {
    /// True when every table is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.settings == 0 && self.categories == 0 && self.items == 0 && self.admins == 0
    }
}

/// Count/find/create/update/delete over settings, categories, items and
/// admins.
///
/// Lists come back in display order: categories by `order` then `id`,
/// items by `created_at` then `id`.
#[async_trait]
pub trait MenuStore: Send + Sync {
    /// Check connectivity.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Release connections. The store must not be used afterwards.
    async fn close(&self);

    /// Counts of all four tables.
    async fn counts(&self) -> Result<StoreCounts, RepositoryError> {
        Ok(StoreCounts {
            settings: self.count_settings().await?,
            categories: self.count_categories().await?,
            items: self.count_items().await?,
            admins: self.count_admins().await?,
        })
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    async fn count_settings(&self) -> Result<i64, RepositoryError>;

    /// The first settings row by id, if any.
    async fn first_settings(&self) -> Result<Option<RestaurantSettings>, RepositoryError>;

    async fn create_settings(
        &self,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError>;

    /// Replace the fields of an existing row.
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist.
    async fn update_settings(
        &self,
        id: SettingsId,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError>;

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    async fn count_categories(&self) -> Result<i64, RepositoryError>;

    async fn list_categories(&self, visible_only: bool) -> Result<Vec<Category>, RepositoryError>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// Highest `order` in use, `None` when there are no categories.
    async fn max_category_order(&self) -> Result<Option<i32>, RepositoryError>;

    async fn create_category(&self, new: &NewCategory) -> Result<Category, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the category does not exist.
    async fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError>;

    /// Delete a category row.
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist and
    /// `RepositoryError::ForeignKey` if items still reference it.
    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError>;

    // ---------------------------------------------------------------------
    // Menu items
    // ---------------------------------------------------------------------

    async fn count_items(&self) -> Result<i64, RepositoryError>;

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError>;

    async fn list_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<MenuItem>, RepositoryError>;

    async fn get_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError>;

    /// Returns `RepositoryError::ForeignKey` if the category does not exist.
    async fn create_item(&self, new: &NewMenuItem) -> Result<MenuItem, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the item does not exist and
    /// `RepositoryError::ForeignKey` if the category does not exist.
    async fn update_item(
        &self,
        id: MenuItemId,
        item: &NewMenuItem,
    ) -> Result<MenuItem, RepositoryError>;

    /// Returns `RepositoryError::NotFound` if the item does not exist.
    async fn delete_item(&self, id: MenuItemId) -> Result<(), RepositoryError>;

    /// Delete every item of a category, returning how many were removed.
    async fn delete_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<u64, RepositoryError>;

    // ---------------------------------------------------------------------
    // Admins
    // ---------------------------------------------------------------------

    async fn count_admins(&self) -> Result<i64, RepositoryError>;

    async fn find_admin_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError>;

    async fn get_admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError>;

    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create_admin(&self, new: &NewAdmin) -> Result<Admin, RepositoryError>;
}

/// Shared handle to whichever store the process was configured with.
pub type SharedStore = Arc<dyn MenuStore>;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Open the store named by `database_url`.
///
/// `memory:` selects [`MemoryStore`]; anything else is treated as a
/// `PostgreSQL` connection string.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `PostgreSQL` pool cannot be created.
pub async fn open_store(database_url: &SecretString) -> Result<SharedStore, sqlx::Error> {
    if database_url.expose_secret().starts_with(MEMORY_URL_PREFIX) {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = create_pool(database_url).await?;
    Ok(Arc::new(PgMenuStore::new(pool)))
}

/// Classify a failed write.
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::ForeignKey(format!("{what} references a missing record"));
        }
    }
    RepositoryError::Database(err)
}
