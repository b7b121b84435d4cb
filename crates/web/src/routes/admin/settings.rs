//! Admin settings routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{RestaurantSettings, SettingsUpdate};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// GET /api/admin/settings
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<RestaurantSettings>> {
    Ok(Json(CatalogService::new(state.menu()).settings().await?))
}

/// PUT /api/admin/settings
///
/// Merges the provided fields, creating the settings row if needed.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: std::result::Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<Json<RestaurantSettings>> {
    let Json(update) = body?;
    let settings = CatalogService::new(state.menu())
        .update_settings(update)
        .await?;
    tracing::info!(admin_id = %admin.id, "Settings updated");
    Ok(Json(settings))
}
