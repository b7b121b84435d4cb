//! Public menu routes.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::models::CategoryWithItems;
use crate::state::AppState;

/// Visible categories in display order, each with its items.
///
/// GET /api/menu
#[instrument(skip(state))]
pub async fn menu(State(state): State<AppState>) -> Result<Json<Vec<CategoryWithItems>>> {
    Ok(Json(state.menu().menu().await?))
}
