//! `PostgreSQL` implementation of [`MenuStore`].
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use qaima_core::{AdminId, CategoryId, Email, MenuItemId, SettingsId};

use super::{MenuStore, RepositoryError, map_write_error};
use crate::models::{
    Admin, Category, CategoryUpdate, MenuItem, NewAdmin, NewCategory, NewMenuItem,
    RestaurantSettings, SettingsFields,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    id: i32,
    restaurant_name: String,
    logo_url: Option<String>,
    primary_color: String,
    secondary_color: String,
    background_color: String,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    address: Option<String>,
    working_hours: Option<String>,
    welcome_text: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SettingsRow> for RestaurantSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            id: SettingsId::new(row.id),
            fields: SettingsFields {
                restaurant_name: row.restaurant_name,
                logo_url: row.logo_url,
                primary_color: row.primary_color,
                secondary_color: row.secondary_color,
                background_color: row.background_color,
                contact_phone: row.contact_phone,
                contact_email: row.contact_email,
                address: row.address,
                working_hours: row.working_hours,
                welcome_text: row.welcome_text,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    image: Option<String>,
    sort_order: i32,
    visible: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            image: row.image,
            order: row.sort_order,
            visible: row.visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i32,
    name: String,
    description: Option<String>,
    price: String,
    category_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: MenuItemId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: CategoryId::new(row.category_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: i32,
    email: String,
    password_hash: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepositoryError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminId::new(row.id),
            email,
            password_hash: row.password_hash,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

const SETTINGS_COLUMNS: &str = "id, restaurant_name, logo_url, primary_color, secondary_color, \
     background_color, contact_phone, contact_email, address, working_hours, welcome_text, \
     created_at, updated_at";

const CATEGORY_COLUMNS: &str =
    "id, name, description, image, sort_order, visible, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, name, description, price, category_id, created_at, updated_at";

const ADMIN_COLUMNS: &str = "id, email, password_hash, name, created_at";

// =============================================================================
// Store
// =============================================================================

/// [`MenuStore`] backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgMenuStore {
    pool: PgPool,
}

impl PgMenuStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn count(&self, table: &str) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM menu.{table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    async fn count_settings(&self) -> Result<i64, RepositoryError> {
        self.count("settings").await
    }

    async fn first_settings(&self) -> Result<Option<RestaurantSettings>, RepositoryError> {
        let row: Option<SettingsRow> = sqlx::query_as(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM menu.settings ORDER BY id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_settings(
        &self,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let row: SettingsRow = sqlx::query_as(&format!(
            r"
            INSERT INTO menu.settings (
                restaurant_name, logo_url, primary_color, secondary_color, background_color,
                contact_phone, contact_email, address, working_hours, welcome_text
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SETTINGS_COLUMNS}
            "
        ))
        .bind(&fields.restaurant_name)
        .bind(&fields.logo_url)
        .bind(&fields.primary_color)
        .bind(&fields.secondary_color)
        .bind(&fields.background_color)
        .bind(&fields.contact_phone)
        .bind(&fields.contact_email)
        .bind(&fields.address)
        .bind(&fields.working_hours)
        .bind(&fields.welcome_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "settings"))?;

        Ok(row.into())
    }

    async fn update_settings(
        &self,
        id: SettingsId,
        fields: &SettingsFields,
    ) -> Result<RestaurantSettings, RepositoryError> {
        let row: Option<SettingsRow> = sqlx::query_as(&format!(
            r"
            UPDATE menu.settings SET
                restaurant_name = $2, logo_url = $3, primary_color = $4,
                secondary_color = $5, background_color = $6, contact_phone = $7,
                contact_email = $8, address = $9, working_hours = $10, welcome_text = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SETTINGS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&fields.restaurant_name)
        .bind(&fields.logo_url)
        .bind(&fields.primary_color)
        .bind(&fields.secondary_color)
        .bind(&fields.background_color)
        .bind(&fields.contact_phone)
        .bind(&fields.contact_email)
        .bind(&fields.address)
        .bind(&fields.working_hours)
        .bind(&fields.welcome_text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "settings"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    async fn count_categories(&self) -> Result<i64, RepositoryError> {
        self.count("category").await
    }

    async fn list_categories(&self, visible_only: bool) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            r"
            SELECT {CATEGORY_COLUMNS} FROM menu.category
            WHERE (NOT $1 OR visible)
            ORDER BY sort_order ASC, id ASC
            "
        ))
        .bind(visible_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM menu.category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn max_category_order(&self) -> Result<Option<i32>, RepositoryError> {
        let max: Option<i32> = sqlx::query_scalar("SELECT MAX(sort_order) FROM menu.category")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn create_category(&self, new: &NewCategory) -> Result<Category, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(&format!(
            r"
            INSERT INTO menu.category (name, description, image, sort_order, visible)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.image)
        .bind(new.order)
        .bind(new.visible)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;

        Ok(row.into())
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            r"
            UPDATE menu.category SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image = COALESCE($4, image),
                sort_order = COALESCE($5, sort_order),
                visible = COALESCE($6, visible),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.image)
        .bind(update.order)
        .bind(update.visible)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu.category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "category"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Menu items
    // ---------------------------------------------------------------------

    async fn count_items(&self) -> Result<i64, RepositoryError> {
        self.count("menu_item").await
    }

    async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu.menu_item ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            r"
            SELECT {ITEM_COLUMNS} FROM menu.menu_item
            WHERE category_id = $1
            ORDER BY created_at ASC, id ASC
            "
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu.menu_item WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn create_item(&self, new: &NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            r"
            INSERT INTO menu.menu_item (name, description, price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.price)
        .bind(new.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "menu item"))?;

        Ok(row.into())
    }

    async fn update_item(
        &self,
        id: MenuItemId,
        item: &NewMenuItem,
    ) -> Result<MenuItem, RepositoryError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            r"
            UPDATE menu.menu_item SET
                name = $2, description = $3, price = $4, category_id = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.price)
        .bind(item.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "menu item"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    async fn delete_item(&self, id: MenuItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu.menu_item WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM menu.menu_item WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ---------------------------------------------------------------------
    // Admins
    // ---------------------------------------------------------------------

    async fn count_admins(&self) -> Result<i64, RepositoryError> {
        self.count("admin").await
    }

    async fn find_admin_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        let row: Option<AdminRow> = sqlx::query_as(&format!(
            "SELECT {ADMIN_COLUMNS} FROM menu.admin WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get_admin(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let row: Option<AdminRow> = sqlx::query_as(&format!(
            "SELECT {ADMIN_COLUMNS} FROM menu.admin WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create_admin(&self, new: &NewAdmin) -> Result<Admin, RepositoryError> {
        let row: AdminRow = sqlx::query_as(&format!(
            r"
            INSERT INTO menu.admin (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "admin email"))?;

        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    //! These run against a real database: set `DATABASE_URL` and pass
    //! `--ignored`.

    use secrecy::SecretString;

    use super::*;
    use crate::db::create_pool;

    async fn store() -> PgMenuStore {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = create_pool(&SecretString::from(url)).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        PgMenuStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_item_requires_existing_category() {
        let store = store().await;
        let err = store
            .create_item(&NewMenuItem {
                name: "ماء معدني".to_owned(),
                description: None,
                price: "4 ريال".to_owned(),
                category_id: CategoryId::new(i32::MAX),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKey(_)));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_category_delete_blocked_by_items() {
        let store = store().await;
        let category = store
            .create_category(&NewCategory {
                name: "مؤقت".to_owned(),
                description: None,
                image: None,
                order: 99,
                visible: false,
            })
            .await
            .unwrap();
        store
            .create_item(&NewMenuItem {
                name: "صنف".to_owned(),
                description: None,
                price: "1 ريال".to_owned(),
                category_id: category.id,
            })
            .await
            .unwrap();

        let err = store.delete_category(category.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKey(_)));

        assert_eq!(store.delete_items_by_category(category.id).await.unwrap(), 1);
        store.delete_category(category.id).await.unwrap();
    }
}
