//! Menu items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qaima_core::{CategoryId, MenuItemId};

use super::Category;

/// A dish or drink on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: Option<String>,
    /// Free text as shown to guests, e.g. `"15 ريال"`.
    pub price: String,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting or fully replacing a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category_id: CategoryId,
}

/// An item together with its owning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemWithCategory {
    #[serde(flatten)]
    pub item: MenuItem,
    pub category: Category,
}
