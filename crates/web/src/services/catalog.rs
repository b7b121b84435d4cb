//! Admin content management: categories, items and settings.
//!
//! Every write invalidates the cache scopes it affects.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use qaima_core::{CategoryId, MenuItemId};

use super::menu::{CacheScope, MenuService, unsaved_settings, with_items};
use crate::db::{MenuStore, RepositoryError};
use crate::models::{
    Category, CategoryUpdate, CategoryWithItems, MenuItemWithCategory, NewCategory, NewMenuItem,
    RestaurantSettings, SettingsFields, SettingsUpdate,
};

/// Message used when an item is missing a required field.
pub const ITEM_FIELDS_REQUIRED: &str = "Name, price, and category are required";

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Item not found")]
    ItemNotFound,

    /// Store failure.
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A category id sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Number(i32),
    Text(String),
}

impl IdInput {
    fn parse(&self) -> Option<CategoryId> {
        match self {
            Self::Number(n) => Some(CategoryId::new(*n)),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// Body for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub order: Option<i32>,
    pub visible: Option<bool>,
}

/// Body for creating or replacing an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<IdInput>,
}

impl ItemInput {
    fn validate(self) -> Result<NewMenuItem, CatalogError> {
        let required = || CatalogError::Validation(ITEM_FIELDS_REQUIRED.to_owned());
        let name = non_blank(self.name).ok_or_else(required)?;
        let price = non_blank(self.price).ok_or_else(required)?;
        let category_id = self
            .category_id
            .as_ref()
            .and_then(IdInput::parse)
            .ok_or_else(required)?;

        Ok(NewMenuItem {
            name,
            description: self.description,
            price,
            category_id,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Admin operations over the store, keeping the menu cache coherent.
pub struct CatalogService<'a> {
    menu: &'a MenuService,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(menu: &'a MenuService) -> Self {
        Self { menu }
    }

    fn store(&self) -> &dyn MenuStore {
        self.menu.store()
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories, hidden ones included, with their items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn categories(&self) -> Result<Vec<CategoryWithItems>, CatalogError> {
        let categories = self.store().list_categories(false).await?;
        Ok(with_items(self.store(), categories).await?)
    }

    /// One category with its items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if it does not exist.
    pub async fn category(&self, id: CategoryId) -> Result<CategoryWithItems, CatalogError> {
        let category = self
            .store()
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;
        let items = self.store().list_items_by_category(id).await?;
        Ok(CategoryWithItems { category, items })
    }

    /// Create a category.
    ///
    /// `order` defaults to one past the highest existing order (0 for the
    /// first category) and `visible` defaults to true.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the name is missing.
    #[instrument(skip(self))]
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category, CatalogError> {
        let name = non_blank(input.name)
            .ok_or_else(|| CatalogError::Validation("Name is required".to_owned()))?;

        let order = match input.order {
            Some(order) => order,
            None => self
                .store()
                .max_category_order()
                .await?
                .map_or(0, |max| max.saturating_add(1)),
        };

        let category = self
            .store()
            .create_category(&NewCategory {
                name,
                description: input.description,
                image: input.image,
                order,
                visible: input.visible.unwrap_or(true),
            })
            .await?;

        self.menu.invalidate(CacheScope::Categories).await;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Apply a partial update to a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category, CatalogError> {
        let category = self
            .store()
            .update_category(id, &update)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::CategoryNotFound,
                other => CatalogError::Repository(other),
            })?;

        self.menu.invalidate(CacheScope::Categories).await;
        Ok(category)
    }

    /// Delete a category after deleting its items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<u64, CatalogError> {
        if self.store().get_category(id).await?.is_none() {
            return Err(CatalogError::CategoryNotFound);
        }

        let removed_items = self.store().delete_items_by_category(id).await?;
        self.store()
            .delete_category(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::CategoryNotFound,
                other => CatalogError::Repository(other),
            })?;

        self.menu.invalidate(CacheScope::All).await;
        tracing::info!(category_id = %id, removed_items, "Category deleted");
        Ok(removed_items)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// All items with their category, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails, including when
    /// an item's category has disappeared.
    pub async fn items(&self) -> Result<Vec<MenuItemWithCategory>, CatalogError> {
        let categories = self.store().list_categories(false).await?;
        let items = self.store().list_items().await?;

        items
            .into_iter()
            .map(|item| {
                let category = categories
                    .iter()
                    .find(|c| c.id == item.category_id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "item {} references missing category {}",
                            item.id, item.category_id
                        ))
                    })?;
                Ok::<_, CatalogError>(MenuItemWithCategory { item, category })
            })
            .collect()
    }

    /// One item with its category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ItemNotFound` if it does not exist.
    pub async fn item(&self, id: MenuItemId) -> Result<MenuItemWithCategory, CatalogError> {
        let item = self
            .store()
            .get_item(id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;
        let category = self
            .store()
            .get_category(item.category_id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;
        Ok(MenuItemWithCategory { item, category })
    }

    /// Create an item in an existing category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if name, price or category is
    /// missing, and `CatalogError::CategoryNotFound` if the category does
    /// not exist.
    #[instrument(skip(self))]
    pub async fn create_item(&self, input: ItemInput) -> Result<MenuItemWithCategory, CatalogError> {
        let new = input.validate()?;
        let category = self.require_category(new.category_id).await?;

        let item = self
            .store()
            .create_item(&new)
            .await
            .map_err(map_item_error)?;

        self.menu.invalidate(CacheScope::Items).await;
        tracing::info!(item_id = %item.id, category_id = %category.id, "Item created");
        Ok(MenuItemWithCategory { item, category })
    }

    /// Replace an item. Same validation as [`Self::create_item`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ItemNotFound` if the item does not exist, plus
    /// the errors of [`Self::create_item`].
    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        id: MenuItemId,
        input: ItemInput,
    ) -> Result<MenuItemWithCategory, CatalogError> {
        let replacement = input.validate()?;
        let category = self.require_category(replacement.category_id).await?;

        let item = self
            .store()
            .update_item(id, &replacement)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CatalogError::ItemNotFound,
                other => map_item_error(other),
            })?;

        self.menu.invalidate(CacheScope::Items).await;
        Ok(MenuItemWithCategory { item, category })
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ItemNotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: MenuItemId) -> Result<(), CatalogError> {
        self.store().delete_item(id).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::ItemNotFound,
            other => CatalogError::Repository(other),
        })?;

        self.menu.invalidate(CacheScope::Items).await;
        Ok(())
    }

    async fn require_category(&self, id: CategoryId) -> Result<Category, CatalogError> {
        self.store()
            .get_category(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Current settings, or unsaved column defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn settings(&self) -> Result<RestaurantSettings, CatalogError> {
        Ok(self
            .store()
            .first_settings()
            .await?
            .unwrap_or_else(unsaved_settings))
    }

    /// Merge `update` into the settings row, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn update_settings(
        &self,
        update: SettingsUpdate,
    ) -> Result<RestaurantSettings, CatalogError> {
        let settings = match self.store().first_settings().await? {
            Some(existing) => {
                let fields = update.apply(existing.fields);
                self.store().update_settings(existing.id, &fields).await?
            }
            None => {
                let fields = update.apply(SettingsFields::default());
                self.store().create_settings(&fields).await?
            }
        };

        self.menu.invalidate(CacheScope::Settings).await;
        Ok(settings)
    }
}

/// A foreign-key failure on item write means the category vanished.
fn map_item_error(err: RepositoryError) -> CatalogError {
    match err {
        RepositoryError::ForeignKey(_) => CatalogError::CategoryNotFound,
        other => CatalogError::Repository(other),
    }
}
