//! Cached read paths for the public menu.
//!
//! | key                   | value                          | TTL   |
//! |-----------------------|--------------------------------|-------|
//! | `restaurant-settings` | settings                       | 5 min |
//! | `categories-false`    | visible categories             | 3 min |
//! | `categories-true`     | visible categories with items  | 3 min |
//! | `items-category-{id}` | items of one category          | 2 min |
//!
//! Admin writes call [`MenuService::invalidate`] with the affected scope.

use std::time::Duration;

use chrono::Utc;
use tracing::instrument;

use qaima_core::{CategoryId, SettingsId};

use crate::cache::TtlCache;
use crate::db::{MenuStore, RepositoryError, SharedStore};
use crate::models::{Category, CategoryWithItems, MenuItem, RestaurantSettings, SettingsFields};

pub const SETTINGS_KEY: &str = "restaurant-settings";
pub const SETTINGS_TTL: Duration = Duration::from_secs(5 * 60);
pub const CATEGORIES_TTL: Duration = Duration::from_secs(3 * 60);
pub const ITEMS_TTL: Duration = Duration::from_secs(2 * 60);

const HEALTH_KEY: &str = "health-check";

fn categories_key(include_items: bool) -> String {
    format!("categories-{include_items}")
}

fn items_key(category_id: CategoryId) -> String {
    format!("items-category-{category_id}")
}

/// Values stored in the menu cache.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Settings(Box<RestaurantSettings>),
    Categories(Vec<Category>),
    Menu(Vec<CategoryWithItems>),
    Items(Vec<MenuItem>),
    Probe,
}

/// Which cached entries a write makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Settings only.
    Settings,
    /// Both category lists.
    Categories,
    /// Anything holding items; clears the whole cache.
    Items,
    /// Everything.
    All,
}

/// Store access with the public read paths cached.
#[derive(Clone)]
pub struct MenuService {
    store: SharedStore,
    cache: TtlCache<CacheValue>,
}

impl MenuService {
    /// Wrap `store` with a cache of at most `cache_capacity` entries.
    #[must_use]
    pub fn new(store: SharedStore, cache_capacity: u64) -> Self {
        Self {
            store,
            cache: TtlCache::new(cache_capacity),
        }
    }

    /// The underlying store, for uncached access.
    #[must_use]
    pub fn store(&self) -> &dyn MenuStore {
        self.store.as_ref()
    }

    /// Restaurant settings, or unsaved column defaults if no row exists yet.
    ///
    /// Only a stored row is cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn settings(&self) -> Result<RestaurantSettings, RepositoryError> {
        let key = SETTINGS_KEY.to_owned();
        if let Some(CacheValue::Settings(settings)) = self.cache.get(&key).await {
            return Ok(*settings);
        }

        let Some(settings) = self.store.first_settings().await? else {
            tracing::debug!("No settings stored, serving defaults");
            return Ok(unsaved_settings());
        };
        self.cache
            .set(key, CacheValue::Settings(Box::new(settings.clone())), SETTINGS_TTL)
            .await;
        Ok(settings)
    }

    /// Visible categories in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn visible_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let key = categories_key(false);
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&key).await {
            return Ok(categories);
        }

        let categories = self.store.list_categories(true).await?;
        self.cache
            .set(key, CacheValue::Categories(categories.clone()), CATEGORIES_TTL)
            .await;
        Ok(categories)
    }

    /// Visible categories in display order, each with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn menu(&self) -> Result<Vec<CategoryWithItems>, RepositoryError> {
        let key = categories_key(true);
        if let Some(CacheValue::Menu(menu)) = self.cache.get(&key).await {
            return Ok(menu);
        }

        let categories = self.store.list_categories(true).await?;
        let menu = with_items(self.store(), categories).await?;
        self.cache
            .set(key, CacheValue::Menu(menu.clone()), CATEGORIES_TTL)
            .await;
        Ok(menu)
    }

    /// Items of one category, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let key = items_key(category_id);
        if let Some(CacheValue::Items(items)) = self.cache.get(&key).await {
            return Ok(items);
        }

        let items = self.store.list_items_by_category(category_id).await?;
        self.cache
            .set(key, CacheValue::Items(items.clone()), ITEMS_TTL)
            .await;
        Ok(items)
    }

    /// Drop cached entries made stale by a write.
    pub async fn invalidate(&self, scope: CacheScope) {
        match scope {
            CacheScope::Settings => self.cache.delete(&SETTINGS_KEY.to_owned()).await,
            CacheScope::Categories => {
                self.cache.delete(&categories_key(false)).await;
                self.cache.delete(&categories_key(true)).await;
            }
            CacheScope::Items | CacheScope::All => self.cache.clear().await,
        }
        tracing::debug!(?scope, "Cache invalidated");
    }

    /// Load settings and visible categories into the cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn warm(&self) -> Result<(), RepositoryError> {
        self.settings().await?;
        self.visible_categories().await?;
        tracing::info!("Cache warmed");
        Ok(())
    }

    /// Write and read back a probe entry.
    pub async fn cache_healthy(&self) -> bool {
        let key = HEALTH_KEY.to_owned();
        self.cache
            .set(key.clone(), CacheValue::Probe, Duration::from_secs(1))
            .await;
        matches!(self.cache.get(&key).await, Some(CacheValue::Probe))
    }

    /// Empty the cache and close the store.
    pub async fn shutdown(&self) {
        self.cache.clear().await;
        self.store.close().await;
    }
}

/// Column defaults for a store without a settings row.
///
/// Never written: a stored row would take the store out of the all-empty
/// state that default seeding waits for. The id is `0`, which no stored
/// row has.
#[must_use]
pub fn unsaved_settings() -> RestaurantSettings {
    let now = Utc::now();
    RestaurantSettings {
        id: SettingsId::new(0),
        fields: SettingsFields::default(),
        created_at: now,
        updated_at: now,
    }
}

/// Attach each category's items.
///
/// # Errors
///
/// Returns `RepositoryError` if the store fails.
pub async fn with_items(
    store: &dyn MenuStore,
    categories: Vec<Category>,
) -> Result<Vec<CategoryWithItems>, RepositoryError> {
    let mut menu = Vec::with_capacity(categories.len());
    for category in categories {
        let items = store.list_items_by_category(category.id).await?;
        menu.push(CategoryWithItems { category, items });
    }
    Ok(menu)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{CategoryUpdate, NewCategory, NewMenuItem};
    use crate::services::seed;

    fn service() -> (MenuService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let menu = MenuService::new(store.clone(), 100);
        (menu, store)
    }

    async fn add_category(store: &MemoryStore, name: &str, order: i32, visible: bool) -> Category {
        store
            .create_category(&NewCategory {
                name: name.to_owned(),
                description: None,
                image: None,
                order,
                visible,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_settings_served_without_writing() {
        let (menu, store) = service();
        let settings = menu.settings().await.unwrap();
        assert_eq!(settings.fields, SettingsFields::default());
        assert_eq!(store.count_settings().await.unwrap(), 0);

        store
            .create_settings(&SettingsFields {
                restaurant_name: "قائمة".to_owned(),
                ..SettingsFields::default()
            })
            .await
            .unwrap();
        assert_eq!(menu.settings().await.unwrap().fields.restaurant_name, "قائمة");
    }

    #[tokio::test]
    async fn test_warm_leaves_empty_store_seedable() {
        let (menu, store) = service();
        menu.warm().await.unwrap();
        assert!(store.counts().await.unwrap().is_empty());

        let outcome = seed::ensure_default_data(store.as_ref()).await.unwrap();
        assert!(outcome.seeded());
        assert_eq!(
            menu.settings().await.unwrap().fields,
            seed::defaults::settings()
        );
    }

    #[tokio::test]
    async fn test_menu_lists_visible_with_items() {
        let (menu, store) = service();
        let drinks = add_category(&store, "المشروبات", 2, true).await;
        let starters = add_category(&store, "المقبلات", 1, true).await;
        add_category(&store, "مخفي", 0, false).await;
        store
            .create_item(&NewMenuItem {
                name: "قهوة عربية".to_owned(),
                description: None,
                price: "8 ريال".to_owned(),
                category_id: drinks.id,
            })
            .await
            .unwrap();

        let listed = menu.menu().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.category.id).collect();
        assert_eq!(ids, [starters.id, drinks.id]);
        assert!(listed[0].items.is_empty());
        assert_eq!(listed[1].items.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_until_invalidated() {
        let (menu, store) = service();
        let category = add_category(&store, "الحلويات", 1, true).await;
        assert_eq!(menu.visible_categories().await.unwrap().len(), 1);

        store
            .update_category(
                category.id,
                &CategoryUpdate {
                    visible: Some(false),
                    ..CategoryUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(menu.visible_categories().await.unwrap().len(), 1);

        menu.invalidate(CacheScope::Categories).await;
        assert!(menu.visible_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_items_scope_clears_items_cache() {
        let (menu, store) = service();
        let category = add_category(&store, "المشويات", 1, true).await;
        assert!(menu.items_by_category(category.id).await.unwrap().is_empty());

        store
            .create_item(&NewMenuItem {
                name: "كباب لحم".to_owned(),
                description: None,
                price: "48 ريال".to_owned(),
                category_id: category.id,
            })
            .await
            .unwrap();
        menu.invalidate(CacheScope::Settings).await;
        assert!(menu.items_by_category(category.id).await.unwrap().is_empty());

        menu.invalidate(CacheScope::Items).await;
        assert_eq!(menu.items_by_category(category.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_probe() {
        let (menu, _) = service();
        assert!(menu.cache_healthy().await);
    }
}
