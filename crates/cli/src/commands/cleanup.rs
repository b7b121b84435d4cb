//! Duplicate category cleanup command.

use qaima_web::db::MenuStore;
use qaima_web::services::cleanup::cleanup_duplicate_categories;

use super::{CliError, open_store};

/// Remove duplicate categories, keeping the newest of each name.
///
/// A server running against the same store keeps serving its cached menu
/// until the entries expire (categories after 3 minutes, items after 2).
///
/// # Errors
///
/// Returns the first store error. Groups already processed stay deleted.
pub async fn run(dry_run: bool) -> Result<(), CliError> {
    let store = open_store().await?;

    let report = cleanup_duplicate_categories(store.as_ref(), dry_run).await?;
    for group in &report.groups {
        tracing::info!(
            "{}: kept {}, {} {} categories ({} items)",
            group.name,
            group.kept,
            if dry_run { "would remove" } else { "removed" },
            group.removed.len(),
            group.removed_items,
        );
    }
    tracing::info!(
        removed_categories = report.removed_categories(),
        dry_run,
        "Cleanup complete"
    );
    if !dry_run && report.removed_categories() > 0 {
        tracing::info!("A running server may show removed categories until its cache expires");
    }

    store.close().await;
    Ok(())
}
