//! Default-data reconciliation.
//!
//! [`ensure_default_data`] writes the default dataset only when the store is
//! completely empty. [`fill_missing_defaults`] is the gentler variant used by
//! `qaima seed --fill-missing`: it creates each default record that is
//! missing by name and leaves everything else alone.
//!
//! A store where some tables are populated and others are empty is left as
//! is by [`ensure_default_data`]. Neither function guards against being run
//! concurrently with itself.

pub mod defaults;

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::instrument;

use qaima_core::{CategoryId, Email};

use crate::db::{MenuStore, RepositoryError, StoreCounts};
use crate::models::{NewAdmin, NewCategory, NewMenuItem};
use crate::services::auth::{AuthError, hash_password};

use defaults::{ADMIN_EMAIL, ADMIN_NAME, ADMIN_PASSWORD, CATEGORIES, DefaultCategory};

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Store read or write failed.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Default admin could not be prepared.
    #[error("admin setup failed: {0}")]
    Auth(#[from] AuthError),
}

/// What [`ensure_default_data`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store was empty; the default dataset was written.
    Seeded(StoreCounts),
    /// Some data already existed; nothing was written.
    Skipped(StoreCounts),
}

impl SeedOutcome {
    /// Whether anything was written.
    #[must_use]
    pub const fn seeded(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

/// What [`fill_missing_defaults`] created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub settings_created: bool,
    pub categories_created: Vec<String>,
    pub items_created: usize,
    pub admin_created: bool,
}

impl FillSummary {
    /// Whether nothing was missing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.settings_created
            && self.categories_created.is_empty()
            && self.items_created == 0
            && !self.admin_created
    }
}

/// Write the default dataset if, and only if, every table is empty.
///
/// # Errors
///
/// Returns `SeedError` if any read or write fails. Writes already made are
/// not rolled back.
#[instrument(skip(store))]
pub async fn ensure_default_data(store: &dyn MenuStore) -> Result<SeedOutcome, SeedError> {
    let counts = store.counts().await?;

    if !counts.is_empty() {
        tracing::info!(
            settings = counts.settings,
            categories = counts.categories,
            items = counts.items,
            admins = counts.admins,
            "Existing data found, skipping default data"
        );
        return Ok(SeedOutcome::Skipped(counts));
    }

    tracing::info!("Store is empty, writing default data");

    store.create_settings(&defaults::settings()).await?;

    for default in &CATEGORIES {
        let category = store.create_category(&new_category(default)).await?;
        create_items(store, default, category.id, &HashSet::new()).await?;
    }

    store.create_admin(&default_admin()?).await?;

    let counts = store.counts().await?;
    tracing::info!(
        categories = counts.categories,
        items = counts.items,
        "Default data written"
    );
    Ok(SeedOutcome::Seeded(counts))
}

/// Create whichever default records are missing.
///
/// Categories and items are matched by exact name. A missing item is
/// attached to the first category carrying its default category's name.
///
/// # Errors
///
/// Returns `SeedError` if any read or write fails.
#[instrument(skip(store))]
pub async fn fill_missing_defaults(store: &dyn MenuStore) -> Result<FillSummary, SeedError> {
    let mut summary = FillSummary::default();

    if store.count_settings().await? == 0 {
        store.create_settings(&defaults::settings()).await?;
        summary.settings_created = true;
        tracing::info!("Created default settings");
    }

    let mut by_name: HashMap<String, CategoryId> = HashMap::new();
    for category in store.list_categories(false).await? {
        by_name.entry(category.name).or_insert(category.id);
    }

    let existing_items: HashSet<String> = store
        .list_items()
        .await?
        .into_iter()
        .map(|item| item.name)
        .collect();

    for default in &CATEGORIES {
        let category_id = if let Some(id) = by_name.get(default.name) {
            *id
        } else {
            let category = store.create_category(&new_category(default)).await?;
            tracing::info!(name = default.name, "Created default category");
            summary.categories_created.push(default.name.to_owned());
            by_name.insert(category.name, category.id);
            category.id
        };

        summary.items_created += create_items(store, default, category_id, &existing_items).await?;
    }

    if store.count_admins().await? == 0 {
        store.create_admin(&default_admin()?).await?;
        summary.admin_created = true;
        tracing::info!(email = ADMIN_EMAIL, "Created default admin");
    }

    tracing::info!(
        settings = summary.settings_created,
        categories = summary.categories_created.len(),
        items = summary.items_created,
        admin = summary.admin_created,
        "Filled missing defaults"
    );
    Ok(summary)
}

fn new_category(default: &DefaultCategory) -> NewCategory {
    NewCategory {
        name: default.name.to_owned(),
        description: Some(default.description.to_owned()),
        image: Some(default.image.to_owned()),
        order: default.order,
        visible: true,
    }
}

/// Create the default items of `default` under `category_id`, skipping any
/// name in `skip`.
async fn create_items(
    store: &dyn MenuStore,
    default: &DefaultCategory,
    category_id: CategoryId,
    skip: &HashSet<String>,
) -> Result<usize, RepositoryError> {
    let mut created = 0;
    for (name, description, price) in default.items {
        if skip.contains(*name) {
            continue;
        }
        store
            .create_item(&NewMenuItem {
                name: (*name).to_owned(),
                description: Some((*description).to_owned()),
                price: (*price).to_owned(),
                category_id,
            })
            .await?;
        created += 1;
    }
    Ok(created)
}

fn default_admin() -> Result<NewAdmin, AuthError> {
    Ok(NewAdmin {
        email: Email::parse(ADMIN_EMAIL)?,
        password_hash: hash_password(ADMIN_PASSWORD)?,
        name: ADMIN_NAME.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::SettingsFields;
    use crate::services::auth::AuthService;

    fn seeded_counts() -> StoreCounts {
        StoreCounts {
            settings: 1,
            categories: 5,
            items: 30,
            admins: 1,
        }
    }

    #[tokio::test]
    async fn test_empty_store_gets_full_dataset() {
        let store = MemoryStore::new();

        let outcome = ensure_default_data(&store).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded(seeded_counts()));

        let categories = store.list_categories(true).await.unwrap();
        let orders: Vec<i32> = categories.iter().map(|c| c.order).collect();
        assert_eq!(orders, [1, 2, 3, 4, 5]);
        for category in &categories {
            let items = store.list_items_by_category(category.id).await.unwrap();
            assert_eq!(items.len(), 6, "category {}", category.name);
        }

        let settings = store.first_settings().await.unwrap().unwrap();
        assert_eq!(settings.fields.restaurant_name, "مطعمنا المميز");
    }

    #[tokio::test]
    async fn test_default_admin_can_log_in() {
        let store = MemoryStore::new();
        ensure_default_data(&store).await.unwrap();

        let admin = AuthService::new(&store)
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(admin.name, ADMIN_NAME);
        assert!(admin.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_second_run_is_a_noop() {
        let store = MemoryStore::new();
        ensure_default_data(&store).await.unwrap();

        let outcome = ensure_default_data(&store).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Skipped(seeded_counts()));
        assert_eq!(store.counts().await.unwrap(), seeded_counts());
    }

    #[tokio::test]
    async fn test_any_existing_row_blocks_seeding() {
        let store = MemoryStore::new();
        store
            .create_settings(&SettingsFields::default())
            .await
            .unwrap();

        let outcome = ensure_default_data(&store).await.unwrap();
        assert!(!outcome.seeded());

        let counts = store.counts().await.unwrap();
        assert_eq!(
            counts,
            StoreCounts {
                settings: 1,
                ..StoreCounts::default()
            }
        );
    }

    #[tokio::test]
    async fn test_existing_admin_alone_blocks_seeding() {
        let store = MemoryStore::new();
        AuthService::new(&store)
            .create_admin("owner@restaurant.com", "المالك", "secret-pass")
            .await
            .unwrap();

        assert!(!ensure_default_data(&store).await.unwrap().seeded());
        assert_eq!(store.count_categories().await.unwrap(), 0);
        assert_eq!(store.count_settings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fill_missing_completes_partial_store() {
        let store = MemoryStore::new();
        let grills = store
            .create_category(&NewCategory {
                name: "المشويات".to_owned(),
                description: None,
                image: None,
                order: 9,
                visible: true,
            })
            .await
            .unwrap();
        store
            .create_item(&NewMenuItem {
                name: "شيش طاووق".to_owned(),
                description: None,
                price: "30 ريال".to_owned(),
                category_id: grills.id,
            })
            .await
            .unwrap();

        let summary = fill_missing_defaults(&store).await.unwrap();
        assert!(summary.settings_created);
        assert!(summary.admin_created);
        assert_eq!(summary.categories_created.len(), 4);
        assert!(!summary.categories_created.contains(&"المشويات".to_owned()));
        assert_eq!(summary.items_created, 29);

        assert_eq!(store.counts().await.unwrap(), seeded_counts());
        assert_eq!(
            store.list_items_by_category(grills.id).await.unwrap().len(),
            6
        );

        let again = fill_missing_defaults(&store).await.unwrap();
        assert!(again.is_noop());
        assert_eq!(store.counts().await.unwrap(), seeded_counts());
    }
}
