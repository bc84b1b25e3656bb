//! Detective zone: query-level outcome records.

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::query::{FetchedData, Zone, ZoneData, ZoneMetadata};
use crate::storage::ContextStore;

/// Result cap when a keyword filter narrows the read.
const FILTERED_LIMIT: u32 = 10;
/// Result cap for unfiltered reads.
const UNFILTERED_LIMIT: u32 = 20;

pub(super) async fn fetch(
    store: &dyn ContextStore,
    product_id: &str,
    filter: Option<&str>,
) -> Result<Option<FetchedData>, StorageError> {
    let limit = if filter.is_some() {
        FILTERED_LIMIT
    } else {
        UNFILTERED_LIMIT
    };

    let records = store.query_records(product_id, filter, limit).await?;
    if records.is_empty() {
        return Ok(None);
    }

    // Records arrive most-recent-first.
    let latest_date: Option<DateTime<Utc>> = records.first().map(|r| r.created_at);

    let metadata = ZoneMetadata {
        record_count: records.len(),
        latest_date,
        query_filter: filter.map(str::to_string),
    };

    Ok(Some(FetchedData {
        zone: Zone::Detective,
        data: ZoneData::Detective(records),
        metadata,
    }))
}
