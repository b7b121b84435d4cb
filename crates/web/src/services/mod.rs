//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Admin password login and signed bearer tokens
//! - `catalog` - Admin CRUD over categories, items and settings
//! - `cleanup` - Duplicate category removal
//! - `menu` - Cached public read paths
//! - `seed` - Default-data reconciliation

pub mod auth;
pub mod catalog;
pub mod cleanup;
pub mod menu;
pub mod seed;
