//! Architect zone: optimization blueprints and scraped page content.

use tracing::warn;

use crate::error::StorageError;
use crate::query::{ArchitectData, FetchedData, Zone, ZoneData, ZoneMetadata};
use crate::storage::{BlueprintProvider, ContextStore};

/// Three independent most-recent reads, issued concurrently. Each
/// sub-source may be absent on its own; a failed sub-read degrades to
/// absence. The zone as a whole is absent only when all three are.
pub(super) async fn fetch(
    store: &dyn ContextStore,
    product_id: &str,
) -> Result<Option<FetchedData>, StorageError> {
    let (openai, gemini, scraped) = tokio::join!(
        store.latest_blueprint(product_id, BlueprintProvider::OpenAi),
        store.latest_blueprint(product_id, BlueprintProvider::Gemini),
        store.latest_scraped_page(product_id),
    );

    let data = ArchitectData {
        openai_blueprint: swallow(openai, "openai_blueprints", product_id),
        gemini_blueprint: swallow(gemini, "gemini_blueprints", product_id),
        scraped_page: swallow(scraped, "scraped_pages", product_id),
    };

    if data.is_empty() {
        return Ok(None);
    }

    let metadata = ZoneMetadata {
        record_count: data.present_count(),
        latest_date: data.latest_date(),
        query_filter: None,
    };

    Ok(Some(FetchedData {
        zone: Zone::Architect,
        data: ZoneData::Architect(data),
        metadata,
    }))
}

fn swallow<T>(
    result: Result<Option<T>, StorageError>,
    sub_source: &'static str,
    product_id: &str,
) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(sub_source, product_id, error = %e, "architect sub-source read failed");
            None
        }
    }
}
