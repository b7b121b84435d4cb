//! Qaima Core - Shared types library.
//!
//! Common types used by the Qaima components:
//! - `web` - Public menu API and admin content management
//! - `cli` - Migrations, seeding, duplicate cleanup
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Database encoding is behind the optional `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Record IDs, admin emails, API error codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
