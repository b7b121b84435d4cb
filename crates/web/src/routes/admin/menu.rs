//! Combined admin menu endpoint.
//!
//! One path for both record kinds, selected by a `type` of `category` or
//! `item`. Kept for clients written against the single-endpoint API; the
//! per-resource routes do the same work.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::instrument;

use qaima_core::{CategoryId, MenuItemId};

use super::super::parse_id;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{CategoryUpdate, CategoryWithItems};
use crate::services::catalog::{CatalogService, CategoryInput, IdInput, ItemInput};
use crate::state::AppState;

const INVALID_TYPE: &str = "Invalid item type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Category,
    Item,
}

impl EntryKind {
    fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some("category") => Ok(Self::Category),
            Some("item") => Ok(Self::Item),
            _ => Err(AppError::BadRequest(INVALID_TYPE.to_string())),
        }
    }
}

/// Query for `DELETE /api/admin/menu`.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Split a request object into its `type`, its `id` and the remaining fields.
fn split_body(body: Value) -> Result<(Option<String>, Option<String>, Map<String, Value>)> {
    let Value::Object(mut fields) = body else {
        return Err(AppError::BadRequest("Expected a JSON object".to_string()));
    };
    let kind = match fields.remove("type") {
        Some(Value::String(kind)) => Some(kind),
        _ => None,
    };
    let id = match fields.remove("id") {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };
    Ok((kind, id, fields))
}

fn fields_as<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

/// GET /api/admin/menu
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<CategoryWithItems>>> {
    Ok(Json(CatalogService::new(state.menu()).categories().await?))
}

/// POST /api/admin/menu
///
/// Returns the created record.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = body?;
    let (kind, _, fields) = split_body(body)?;
    let catalog = CatalogService::new(state.menu());

    let created = match EntryKind::parse(kind.as_deref())? {
        EntryKind::Category => {
            let input: CategoryInput = fields_as(fields)?;
            serde_json::to_value(catalog.create_category(input).await?)
        }
        EntryKind::Item => {
            let input: ItemInput = fields_as(fields)?;
            serde_json::to_value(catalog.create_item(input).await?)
        }
    };
    created
        .map(Json)
        .map_err(|e| AppError::Internal(format!("Failed to encode record: {e}")))
}

/// PUT /api/admin/menu
///
/// Category updates are partial. Item updates are merged onto the stored
/// item and then validated like a full replacement.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = body?;
    let (kind, id, fields) = split_body(body)?;
    let kind = EntryKind::parse(kind.as_deref())?;
    let Some(id) = id else {
        return Err(AppError::BadRequest("Missing id parameter".to_string()));
    };
    let catalog = CatalogService::new(state.menu());

    match kind {
        EntryKind::Category => {
            let id: CategoryId = parse_id(&id)?;
            let update: CategoryUpdate = fields_as(fields)?;
            catalog.update_category(id, update).await?;
        }
        EntryKind::Item => {
            let id: MenuItemId = parse_id(&id)?;
            let patch: ItemInput = fields_as(fields)?;
            let current = catalog.item(id).await?.item;
            let merged = ItemInput {
                name: patch.name.or(Some(current.name)),
                description: patch.description.or(current.description),
                price: patch.price.or(Some(current.price)),
                category_id: patch
                    .category_id
                    .or(Some(IdInput::Number(current.category_id.as_i32()))),
            };
            catalog.update_item(id, merged).await?;
        }
    }
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/admin/menu?id=&type=
///
/// Deleting a category deletes its items.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let Query(query) = query?;
    let (Some(id), Some(kind)) = (query.id, query.kind) else {
        return Err(AppError::BadRequest(
            "Missing id or type parameter".to_string(),
        ));
    };
    let catalog = CatalogService::new(state.menu());

    match EntryKind::parse(Some(&kind))? {
        EntryKind::Category => {
            catalog.delete_category(parse_id(&id)?).await?;
        }
        EntryKind::Item => {
            catalog.delete_item(parse_id(&id)?).await?;
        }
    }
    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind() {
        assert_eq!(EntryKind::parse(Some("item")).ok(), Some(EntryKind::Item));
        assert_eq!(
            EntryKind::parse(Some("category")).ok(),
            Some(EntryKind::Category)
        );
        assert!(EntryKind::parse(Some("drink")).is_err());
        assert!(EntryKind::parse(None).is_err());
    }

    #[test]
    fn test_split_body_accepts_numeric_and_text_ids() {
        let (kind, id, fields) =
            split_body(json!({"type": "item", "id": 7, "price": "9 ريال"})).unwrap();
        assert_eq!(kind.as_deref(), Some("item"));
        assert_eq!(id.as_deref(), Some("7"));
        assert_eq!(fields.len(), 1);

        let (_, id, _) = split_body(json!({"id": "12"})).unwrap();
        assert_eq!(id.as_deref(), Some("12"));

        assert!(split_body(json!([1, 2])).is_err());
    }
}
