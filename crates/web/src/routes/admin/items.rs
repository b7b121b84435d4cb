//! Admin menu item routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::instrument;

use qaima_core::MenuItemId;

use super::super::parse_id;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::MenuItemWithCategory;
use crate::services::catalog::{CatalogService, ItemInput};
use crate::state::AppState;

/// GET /api/admin/items
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<MenuItemWithCategory>>> {
    Ok(Json(CatalogService::new(state.menu()).items().await?))
}

/// POST /api/admin/items
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: std::result::Result<Json<ItemInput>, JsonRejection>,
) -> Result<Json<MenuItemWithCategory>> {
    let Json(input) = body?;
    Ok(Json(
        CatalogService::new(state.menu()).create_item(input).await?,
    ))
}

/// GET /api/admin/items/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MenuItemWithCategory>> {
    let id: MenuItemId = parse_id(&id)?;
    Ok(Json(CatalogService::new(state.menu()).item(id).await?))
}

/// PUT /api/admin/items/{id}
///
/// Full replacement; name, price and category are required.
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<ItemInput>, JsonRejection>,
) -> Result<Json<MenuItemWithCategory>> {
    let id: MenuItemId = parse_id(&id)?;
    let Json(input) = body?;
    Ok(Json(
        CatalogService::new(state.menu())
            .update_item(id, input)
            .await?,
    ))
}

/// DELETE /api/admin/items/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: MenuItemId = parse_id(&id)?;
    CatalogService::new(state.menu()).delete_item(id).await?;
    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
