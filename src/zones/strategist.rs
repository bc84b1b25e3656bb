//! Strategist zone: the most recent performance snapshot.

use crate::error::StorageError;
use crate::query::{FetchedData, Zone, ZoneData, ZoneMetadata};
use crate::storage::ContextStore;

pub(super) async fn fetch(
    store: &dyn ContextStore,
    product_id: &str,
) -> Result<Option<FetchedData>, StorageError> {
    let Some(snapshot) = store.latest_snapshot(product_id).await? else {
        return Ok(None);
    };

    let metadata = ZoneMetadata {
        record_count: 1,
        latest_date: Some(snapshot.created_at),
        query_filter: None,
    };

    Ok(Some(FetchedData {
        zone: Zone::Strategist,
        data: ZoneData::Strategist(snapshot),
        metadata,
    }))
}
