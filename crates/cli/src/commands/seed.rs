//! Default data commands.

use qaima_web::db::MenuStore;
use qaima_web::services::seed::{self, SeedOutcome};

use super::{CliError, open_store};

/// Write default data.
///
/// Without `fill_missing` this only writes into a completely empty store.
/// With it, each missing settings row, category, item and admin is added
/// and existing records are left alone.
///
/// # Errors
///
/// Returns the first store or hashing error.
pub async fn run(fill_missing: bool) -> Result<(), CliError> {
    let store = open_store().await?;

    if fill_missing {
        let summary = seed::fill_missing_defaults(store.as_ref()).await?;
        if summary.is_noop() {
            tracing::info!("All default records already present");
        } else {
            tracing::info!(
                settings_created = summary.settings_created,
                categories_created = ?summary.categories_created,
                items_created = summary.items_created,
                admin_created = summary.admin_created,
                "Missing defaults added"
            );
        }
    } else {
        match seed::ensure_default_data(store.as_ref()).await? {
            SeedOutcome::Seeded(counts) => tracing::info!(
                settings = counts.settings,
                categories = counts.categories,
                items = counts.items,
                admins = counts.admins,
                "Default data written"
            ),
            SeedOutcome::Skipped(counts) => tracing::warn!(
                settings = counts.settings,
                categories = counts.categories,
                items = counts.items,
                admins = counts.admins,
                "Store is not empty, nothing written. Use --fill-missing to add missing records"
            ),
        }
    }

    store.close().await;
    Ok(())
}
