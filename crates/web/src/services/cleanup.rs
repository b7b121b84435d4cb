//! Duplicate category cleanup.
//!
//! Category names are meant to be unique but the store does not enforce it.
//! For every name used by more than one category, the newest category is
//! kept and the others are deleted together with their items.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::instrument;

use qaima_core::CategoryId;

use crate::db::{MenuStore, RepositoryError};
use crate::models::Category;

/// Outcome for one duplicated name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub name: String,
    pub kept: CategoryId,
    pub removed: Vec<CategoryId>,
    /// Items deleted along with the removed categories.
    pub removed_items: u64,
}

/// Result of a cleanup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub groups: Vec<DuplicateGroup>,
    /// True when nothing was deleted because this was a dry run.
    pub dry_run: bool,
}

impl CleanupReport {
    /// Number of categories deleted (or that would be).
    #[must_use]
    pub fn removed_categories(&self) -> usize {
        self.groups.iter().map(|g| g.removed.len()).sum()
    }
}

/// Group categories by exact name, newest first within each group.
///
/// Newest means greatest `created_at`; equal timestamps fall back to the
/// greater id.
fn duplicate_groups(categories: Vec<Category>) -> BTreeMap<String, Vec<Category>> {
    let mut groups: BTreeMap<String, Vec<Category>> = BTreeMap::new();
    for category in categories {
        groups.entry(category.name.clone()).or_default().push(category);
    }
    groups.retain(|_, group| group.len() > 1);
    for group in groups.values_mut() {
        group.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    }
    groups
}

/// Remove duplicate categories, keeping the newest of each name.
///
/// # Errors
///
/// Returns the first `RepositoryError`; deletions already made stay made.
#[instrument(skip(store))]
pub async fn cleanup_duplicate_categories(
    store: &dyn MenuStore,
    dry_run: bool,
) -> Result<CleanupReport, RepositoryError> {
    let categories = store.list_categories(false).await?;
    let mut report = CleanupReport {
        groups: Vec::new(),
        dry_run,
    };

    for (name, group) in duplicate_groups(categories) {
        let mut group = group.into_iter();
        let Some(kept) = group.next() else {
            continue;
        };

        let mut removed = Vec::new();
        let mut removed_items = 0;
        for duplicate in group {
            if dry_run {
                let items = store.list_items_by_category(duplicate.id).await?;
                removed_items += items.len() as u64;
            } else {
                removed_items += store.delete_items_by_category(duplicate.id).await?;
                store.delete_category(duplicate.id).await?;
            }
            removed.push(duplicate.id);
        }

        tracing::info!(
            name = %name,
            kept = %kept.id,
            removed = ?removed,
            removed_items,
            dry_run,
            "Merged duplicate category"
        );

        report.groups.push(DuplicateGroup {
            name,
            kept: kept.id,
            removed,
            removed_items,
        });
    }

    if report.groups.is_empty() {
        tracing::info!("No duplicate categories found");
    }
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewCategory, NewMenuItem};

    async fn category(store: &MemoryStore, name: &str, age_minutes: i64) -> CategoryId {
        let created = store
            .create_category(&NewCategory {
                name: name.to_owned(),
                description: None,
                image: None,
                order: 4,
                visible: true,
            })
            .await
            .unwrap();
        store
            .set_category_created_at(created.id, Utc::now() - TimeDelta::minutes(age_minutes))
            .await;
        created.id
    }

    async fn item(store: &MemoryStore, name: &str, category_id: CategoryId) {
        store
            .create_item(&NewMenuItem {
                name: name.to_owned(),
                description: None,
                price: "20 ريال".to_owned(),
                category_id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_keeps_newest_and_removes_items_of_others() {
        let store = MemoryStore::new();
        let older = category(&store, "الحلويات", 60).await;
        let newer = category(&store, "الحلويات", 5).await;
        let drinks = category(&store, "المشروبات", 30).await;
        item(&store, "بقلاوة", older).await;
        item(&store, "كنافة", older).await;
        item(&store, "أم علي", newer).await;
        item(&store, "قهوة عربية", drinks).await;

        let report = cleanup_duplicate_categories(&store, false).await.unwrap();

        assert_eq!(
            report.groups,
            [DuplicateGroup {
                name: "الحلويات".to_owned(),
                kept: newer,
                removed: vec![older],
                removed_items: 2,
            }]
        );

        let remaining = store.list_categories(false).await.unwrap();
        let ids: Vec<_> = remaining.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&newer) && ids.contains(&drinks));

        let desserts = store.list_items_by_category(newer).await.unwrap();
        assert_eq!(desserts.len(), 1);
        assert_eq!(desserts[0].name, "أم علي");
        assert!(store.list_items_by_category(older).await.unwrap().is_empty());
        assert_eq!(store.count_items().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_many_duplicates_converge_to_one() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for age in [50, 10, 40, 30] {
            ids.push(category(&store, "المقبلات", age).await);
        }
        for id in &ids {
            item(&store, "حمص", *id).await;
        }

        let report = cleanup_duplicate_categories(&store, false).await.unwrap();
        assert_eq!(report.removed_categories(), 3);
        assert_eq!(report.groups[0].kept, ids[1]);

        let remaining = store.list_categories(false).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
        assert_eq!(store.count_items().await.unwrap(), 1);

        let again = cleanup_duplicate_categories(&store, false).await.unwrap();
        assert!(again.groups.is_empty());
    }

    #[tokio::test]
    async fn test_same_timestamp_keeps_later_insert() {
        let store = MemoryStore::new();
        let first = category(&store, "المشويات", 0).await;
        let second = category(&store, "المشويات", 0).await;
        let at = Utc::now();
        store.set_category_created_at(first, at).await;
        store.set_category_created_at(second, at).await;

        let report = cleanup_duplicate_categories(&store, false).await.unwrap();
        assert_eq!(report.groups[0].kept, second);
        assert_eq!(report.groups[0].removed, [first]);
    }

    #[tokio::test]
    async fn test_dry_run_deletes_nothing() {
        let store = MemoryStore::new();
        let older = category(&store, "الحلويات", 60).await;
        category(&store, "الحلويات", 5).await;
        item(&store, "بقلاوة", older).await;

        let report = cleanup_duplicate_categories(&store, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.removed_categories(), 1);
        assert_eq!(report.groups[0].removed_items, 1);

        assert_eq!(store.count_categories().await.unwrap(), 2);
        assert_eq!(store.count_items().await.unwrap(), 1);
    }
}
