//! Context orchestrator: fan-out to zone fetchers, fan-in results.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::storage::ContextStore;
use crate::zones::ZoneFetcher;

use super::types::{FetchedData, IntentAnalysis, Zone};

/// Fans a classified intent out to the indicated zone fetchers and
/// collects the present results.
#[derive(Clone)]
pub struct ContextOrchestrator {
    fetcher: ZoneFetcher,
}

impl ContextOrchestrator {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self {
            fetcher: ZoneFetcher::new(store),
        }
    }

    /// Fetch every zone the intent names, concurrently.
    ///
    /// The effective keyword filter is the explicit override if given,
    /// else the classifier's extracted filter. Duplicate zones are
    /// fetched once; absent results are dropped; relative zone order is
    /// preserved regardless of fetch completion order. An empty return
    /// is the "no data" outcome, not an error, even for a
    /// contract-violating empty zone set.
    pub async fn orchestrate(
        &self,
        intent: &IntentAnalysis,
        product_id: &str,
        filter_override: Option<&str>,
    ) -> Vec<FetchedData> {
        let effective_filter = filter_override.or(intent.query_filter.as_deref());

        let mut seen = HashSet::new();
        let zones: Vec<Zone> = intent
            .zones
            .iter()
            .copied()
            .filter(|zone| seen.insert(*zone))
            .collect();

        let fetches = zones
            .into_iter()
            .map(|zone| self.fetcher.fetch(zone, product_id, effective_filter));

        // join_all preserves input order, so the output list follows
        // the classifier's zone order.
        join_all(fetches).await.into_iter().flatten().collect()
    }
}
