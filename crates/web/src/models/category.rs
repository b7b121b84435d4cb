//! Menu categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qaima_core::CategoryId;

use super::MenuItem;

/// A menu category.
///
/// Names are expected to be unique but the store does not enforce it;
/// see `services::cleanup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Display position; lists sort ascending on this.
    pub order: i32,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub order: i32,
    pub visible: bool,
}

/// Partial category update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub order: Option<i32>,
    pub visible: Option<bool>,
}

impl CategoryUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.order.is_none()
            && self.visible.is_none()
    }

    /// Merge onto an existing category.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
        if let Some(image) = &self.image {
            category.image = Some(image.clone());
        }
        if let Some(order) = self.order {
            category.order = order;
        }
        if let Some(visible) = self.visible {
            category.visible = visible;
        }
    }
}

/// A category together with its items, ordered by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWithItems {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<MenuItem>,
}
