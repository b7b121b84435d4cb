//! Admin routes. Everything except login requires a bearer token.

pub mod auth;
pub mod categories;
pub mod items;
pub mod menu;
pub mod settings;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Routes mounted under `/api/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", axum::routing::post(auth::login))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/items", get(items::list).post(items::create))
        .route(
            "/items/{id}",
            get(items::show).put(items::update).delete(items::delete),
        )
        .route("/settings", get(settings::show).put(settings::update))
        .route(
            "/menu",
            get(menu::list)
                .post(menu::create)
                .put(menu::update)
                .delete(menu::delete),
        )
}
