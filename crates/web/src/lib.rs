//! Qaima web library.
//!
//! Restaurant menu JSON API with an admin content surface. The binary in
//! `main.rs` wires this library to a listener; tests and the CLI use it
//! directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
