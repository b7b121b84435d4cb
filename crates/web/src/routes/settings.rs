//! Public settings route.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::models::RestaurantSettings;
use crate::state::AppState;

/// Restaurant settings, or unsaved defaults before any have been stored.
///
/// GET /api/settings
#[instrument(skip(state))]
pub async fn settings(State(state): State<AppState>) -> Result<Json<RestaurantSettings>> {
    Ok(Json(state.menu().settings().await?))
}
