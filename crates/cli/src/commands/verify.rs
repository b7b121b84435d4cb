//! Store inspection command.

use qaima_web::db::{MenuStore, StoreCounts};

use super::{CliError, open_store};

const SAMPLE_ITEMS: usize = 2;

/// Log the settings, every category with its item count, and a couple of
/// items from each.
///
/// # Errors
///
/// Returns the first store error.
pub async fn run() -> Result<(), CliError> {
    let store = open_store().await?;
    let seen = report(store.as_ref()).await?;
    store.close().await;

    if !seen.has_settings || seen.counts.categories == 0 {
        tracing::warn!("Store is missing default data, run `qaima seed --fill-missing`");
    }
    for (name, _) in seen.item_counts.iter().filter(|(_, n)| *n == 0) {
        tracing::warn!(category = %name, "Category has no items");
    }
    Ok(())
}

/// What [`report`] saw.
#[derive(Debug)]
struct Report {
    has_settings: bool,
    item_counts: Vec<(String, usize)>,
    counts: StoreCounts,
}

async fn report(store: &dyn MenuStore) -> Result<Report, CliError> {
    let settings = store.first_settings().await?;
    match &settings {
        Some(settings) => tracing::info!(
            restaurant_name = %settings.fields.restaurant_name,
            primary_color = %settings.fields.primary_color,
            contact_phone = ?settings.fields.contact_phone,
            "Settings"
        ),
        None => tracing::warn!("No settings row"),
    }

    let categories = store.list_categories(false).await?;
    tracing::info!(count = categories.len(), "Categories");
    let mut item_counts = Vec::with_capacity(categories.len());
    for category in categories {
        let items = store.list_items_by_category(category.id).await?;
        tracing::info!(
            "  [{}] {} (order {}, {}): {} items",
            category.id,
            category.name,
            category.order,
            if category.visible { "visible" } else { "hidden" },
            items.len()
        );
        for item in items.iter().take(SAMPLE_ITEMS) {
            tracing::info!("    - {}: {}", item.name, item.price);
        }
        item_counts.push((category.name, items.len()));
    }

    let counts = store.counts().await?;
    tracing::info!(
        settings = counts.settings,
        categories = counts.categories,
        items = counts.items,
        admins = counts.admins,
        "Totals"
    );
    Ok(Report {
        has_settings: settings.is_some(),
        item_counts,
        counts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qaima_web::db::MemoryStore;
    use qaima_web::services::seed::ensure_default_data;

    use super::*;

    #[tokio::test]
    async fn test_report_on_empty_store() {
        let store = MemoryStore::new();
        let seen = report(&store).await.unwrap();
        assert!(!seen.has_settings);
        assert!(seen.item_counts.is_empty());
        assert!(seen.counts.is_empty());
        assert!(store.counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_report_on_seeded_store() {
        let store = MemoryStore::new();
        ensure_default_data(&store).await.unwrap();

        let seen = report(&store).await.unwrap();
        assert!(seen.has_settings);
        assert_eq!(seen.counts.items, 30);
        assert_eq!(seen.item_counts.len(), 5);
        assert_eq!(seen.item_counts[0], ("المقبلات".to_owned(), 6));
        assert!(seen.item_counts.iter().all(|(_, n)| *n == 6));
    }
}
