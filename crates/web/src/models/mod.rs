//! Domain types for the menu.
//!
//! These are the validated shapes that flow between the store, the
//! services, and the JSON API. Field names serialize in camelCase to match
//! the persisted record shape (`restaurantName`, `categoryId`, ...).

pub mod admin;
pub mod category;
pub mod menu_item;
pub mod settings;

pub use admin::{Admin, AdminProfile, NewAdmin};
pub use category::{Category, CategoryUpdate, CategoryWithItems, NewCategory};
pub use menu_item::{MenuItem, MenuItemWithCategory, NewMenuItem};
pub use settings::{RestaurantSettings, SettingsFields, SettingsUpdate};
