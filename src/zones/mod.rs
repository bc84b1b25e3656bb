//! Zone fetchers.
//!
//! One independent read strategy per zone, each normalizing its result
//! into the common [`FetchedData`] envelope. "No rows" is a normal
//! absent outcome; storage errors degrade to absence with a logged
//! warning, since partial zone data is still usable downstream.

mod architect;
mod detective;
mod strategist;

use std::sync::Arc;

use tracing::warn;

use crate::query::{FetchedData, Zone};
use crate::storage::ContextStore;

/// Dispatches zone fetches against the context store.
#[derive(Clone)]
pub struct ZoneFetcher {
    store: Arc<dyn ContextStore>,
}

impl ZoneFetcher {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    /// Fetch one zone's data for a product.
    ///
    /// The keyword filter only applies to the detective zone.
    pub async fn fetch(
        &self,
        zone: Zone,
        product_id: &str,
        filter: Option<&str>,
    ) -> Option<FetchedData> {
        let result = match zone {
            Zone::Strategist => strategist::fetch(self.store.as_ref(), product_id).await,
            Zone::Detective => detective::fetch(self.store.as_ref(), product_id, filter).await,
            Zone::Architect => architect::fetch(self.store.as_ref(), product_id).await,
        };

        match result {
            Ok(data) => data,
            Err(e) => {
                warn!(zone = %zone, product_id, error = %e, "zone fetch failed, treating as absent");
                None
            }
        }
    }
}
