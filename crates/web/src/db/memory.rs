//! In-process [`MenuStore`].
//!
//! Enforces the same constraints as the `PostgreSQL` schema: unique admin
//! email, items must reference an existing category, and a category cannot
//! be deleted while items reference it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use qaima_core::{AdminId, CategoryId, Email, MenuItemId, SettingsId};

use super::{MenuStore, RepositoryError};
use crate::models::{
    Admin, Category, CategoryUpdate, MenuItem, NewAdmin, NewCategory, NewMenuItem,
    RestaurantSettings, SettingsFields,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    settings: BTreeMap<SettingsId, RestaurantSettings>,
    categories: BTreeMap<CategoryId, Category>,
    items: BTreeMap<MenuItemId, MenuItem>,
    admins: BTreeMap<AdminId, Admin>,
}

impl Tables {
    /// Ids are shared across tables and never reused.
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn category_referenced(&self, id: CategoryId) -> bool {
        self.items.values().any(|item| item.category_id == id)
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Store that keeps everything in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdate a category so tests can control creation order.
    #[cfg(test)]
    pub async fn set_category_created_at(
        &self,
        id: CategoryId,
        created_at: chrono::DateTime<Utc>,
    ) {
        if let Some(category) = self.tables.lock().await.categories.get_mut(&id) {
            category.created_at = created_at;
        }
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {}

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    async fn count_settings(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.lock().await.settings.len()))
    }

    async fn first_settings(&self) -> Result<Option<RestaurantSettings>, RepositoryError> {
        Ok(self.tables.lock().await.settings.values().next().cloned())
    }

    async fn create_settings(
        &self,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let settings = RestaurantSettings {
            id: SettingsId::new(tables.next_id()),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.settings.insert(settings.id, settings.clone());
        Ok(settings)
    }

    async fn update_settings(
        &self,
        id: SettingsId,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let settings = tables
            .settings
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        settings.fields = fields.clone();
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    async fn count_categories(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.lock().await.categories.len()))
    }

    async fn list_categories(&self, visible_only: bool) -> Result<Vec<Category>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| !visible_only || c.visible)
            .cloned()
            .collect();
        categories.sort_by_key(|c| (c.order, c.id));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.tables.lock().await.categories.get(&id).cloned())
    }

    async fn max_category_order(&self) -> Result<Option<i32>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .categories
            .values()
            .map(|c| c.order)
            .max())
    }

    async fn create_category(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(tables.next_id()),
            name: new.name.clone(),
            description: new.description.clone(),
            image: new.image.clone(),
            order: new.order,
            visible: new.visible,
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        update.apply_to(category);
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.categories.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.category_referenced(id) {
            return Err(RepositoryError::ForeignKey(format!(
                "category {id} is still referenced by menu items"
            )));
        }
        tables.categories.remove(&id);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Menu items
    // ---------------------------------------------------------------------

    async fn count_items(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.lock().await.items.len()))
    }

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut items: Vec<MenuItem> = tables.items.values().cloned().collect();
        items.sort_by_key(|i| (i.created_at, i.id));
        Ok(items)
    }

    async fn list_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut items: Vec<MenuItem> = tables
            .items
            .values()
            .filter(|i| i.category_id == category_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.created_at, i.id));
        Ok(items)
    }

    async fn get_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        Ok(self.tables.lock().await.items.get(&id).cloned())
    }

    async fn create_item(&self, new: &NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.categories.contains_key(&new.category_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "category {} does not exist",
                new.category_id
            )));
        }
        let now = Utc::now();
        let item = MenuItem {
            id: MenuItemId::new(tables.next_id()),
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price.clone(),
            category_id: new.category_id,
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(
        &self,
        id: MenuItemId,
        item: &NewMenuItem,
    ) -> Result<MenuItem, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.items.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if !tables.categories.contains_key(&item.category_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "category {} does not exist",
                item.category_id
            )));
        }
        let existing = tables.items.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        existing.name.clone_from(&item.name);
        existing.description.clone_from(&item.description);
        existing.price.clone_from(&item.price);
        existing.category_id = item.category_id;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_item(&self, id: MenuItemId) -> Result<(), RepositoryError> {
        self.tables
            .lock()
            .await
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<u64, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.items.len();
        tables.items.retain(|_, item| item.category_id != category_id);
        Ok(u64::try_from(before - tables.items.len()).unwrap_or(u64::MAX))
    }

    // ---------------------------------------------------------------------
    // Admins
    // ---------------------------------------------------------------------

    async fn count_admins(&self) -> Result<i64, RepositoryError> {
        Ok(count(self.tables.lock().await.admins.len()))
    }

    async fn find_admin_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .admins
            .values()
            .find(|a| &a.email == email)
            .cloned())
    }

    async fn get_admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        Ok(self.tables.lock().await.admins.get(&id).cloned())
    }

    async fn create_admin(&self, new: &NewAdmin) -> Result<Admin, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.admins.values().any(|a| a.email == new.email) {
            return Err(RepositoryError::Conflict(
                "admin email already exists".to_owned(),
            ));
        }
        let admin = Admin {
            id: AdminId::new(tables.next_id()),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            name: new.name.clone(),
            created_at: Utc::now(),
        };
        tables.admins.insert(admin.id, admin.clone());
        Ok(admin)
    }
}
