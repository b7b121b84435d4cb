//! Admin category routes.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Value, json};
use tracing::instrument;

use qaima_core::CategoryId;

use super::super::parse_id;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryUpdate, CategoryWithItems};
use crate::services::catalog::{CatalogService, CategoryInput};
use crate::state::AppState;

/// GET /api/admin/categories
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<CategoryWithItems>>> {
    Ok(Json(CatalogService::new(state.menu()).categories().await?))
}

/// POST /api/admin/categories
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: std::result::Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<Category>> {
    let Json(input) = body?;
    Ok(Json(
        CatalogService::new(state.menu()).create_category(input).await?,
    ))
}

/// GET /api/admin/categories/{id}
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<CategoryWithItems>> {
    let id: CategoryId = parse_id(&id)?;
    Ok(Json(CatalogService::new(state.menu()).category(id).await?))
}

/// PUT /api/admin/categories/{id}
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    body: std::result::Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<Json<Category>> {
    let id: CategoryId = parse_id(&id)?;
    let Json(update) = body?;
    Ok(Json(
        CatalogService::new(state.menu())
            .update_category(id, update)
            .await?,
    ))
}

/// DELETE /api/admin/categories/{id}
///
/// Deletes the category's items first.
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: CategoryId = parse_id(&id)?;
    CatalogService::new(state.menu()).delete_category(id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
