//! In-memory context store used by tests.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::traits::{
    Blueprint, BlueprintProvider, ContextStore, PerformanceSnapshot, Product, QueryRecord,
    ScrapedPage,
};

#[derive(Default)]
struct MemoryState {
    products: Vec<Product>,
    snapshots: Vec<PerformanceSnapshot>,
    query_records: Vec<QueryRecord>,
    openai_blueprints: Vec<Blueprint>,
    gemini_blueprints: Vec<Blueprint>,
    scraped_pages: Vec<ScrapedPage>,
    /// Collection names whose reads fail, for exercising the
    /// fail-open fetch paths.
    failing: HashSet<String>,
}

/// In-memory [`ContextStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_product(&self, product: Product) {
        self.state.write().await.products.push(product);
    }

    pub async fn add_snapshot(&self, snapshot: PerformanceSnapshot) {
        self.state.write().await.snapshots.push(snapshot);
    }

    pub async fn add_query_record(&self, record: QueryRecord) {
        self.state.write().await.query_records.push(record);
    }

    pub async fn add_blueprint(&self, provider: BlueprintProvider, blueprint: Blueprint) {
        let mut state = self.state.write().await;
        match provider {
            BlueprintProvider::OpenAi => state.openai_blueprints.push(blueprint),
            BlueprintProvider::Gemini => state.gemini_blueprints.push(blueprint),
        }
    }

    pub async fn add_scraped_page(&self, page: ScrapedPage) {
        self.state.write().await.scraped_pages.push(page);
    }

    /// Make subsequent reads of one collection fail. Collection names:
    /// `products`, `performance_snapshots`, `query_results`,
    /// `openai_blueprints`, `gemini_blueprints`, `scraped_pages`.
    pub async fn fail_collection(&self, collection: &str) {
        self.state.write().await.failing.insert(collection.to_string());
    }

    fn check(state: &MemoryState, collection: &str) -> Result<(), StorageError> {
        if state.failing.contains(collection) {
            return Err(StorageError::Query(format!(
                "simulated failure reading {collection}"
            )));
        }
        Ok(())
    }
}

fn latest_by_created<'a, T, F>(items: impl Iterator<Item = &'a T>, key: F) -> Option<&'a T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.max_by_key(|item| key(item))
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError> {
        let state = self.state.read().await;
        Self::check(&state, "products")?;
        Ok(state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned())
    }

    async fn latest_snapshot(
        &self,
        product_id: &str,
    ) -> Result<Option<PerformanceSnapshot>, StorageError> {
        let state = self.state.read().await;
        Self::check(&state, "performance_snapshots")?;
        Ok(latest_by_created(
            state.snapshots.iter().filter(|s| s.product_id == product_id),
            |s| s.created_at,
        )
        .cloned())
    }

    async fn query_records(
        &self,
        product_id: &str,
        filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<QueryRecord>, StorageError> {
        let state = self.state.read().await;
        Self::check(&state, "query_results")?;

        let needle = filter.map(str::to_lowercase);
        let mut records: Vec<QueryRecord> = state
            .query_records
            .iter()
            .filter(|r| r.product_id == product_id)
            .filter(|r| match &needle {
                Some(needle) => r.query_text.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn latest_blueprint(
        &self,
        product_id: &str,
        provider: BlueprintProvider,
    ) -> Result<Option<Blueprint>, StorageError> {
        let state = self.state.read().await;
        Self::check(&state, provider.table())?;
        let blueprints = match provider {
            BlueprintProvider::OpenAi => &state.openai_blueprints,
            BlueprintProvider::Gemini => &state.gemini_blueprints,
        };
        Ok(latest_by_created(
            blueprints.iter().filter(|b| b.product_id == product_id),
            |b| b.created_at,
        )
        .cloned())
    }

    async fn latest_scraped_page(
        &self,
        product_id: &str,
    ) -> Result<Option<ScrapedPage>, StorageError> {
        let state = self.state.read().await;
        Self::check(&state, "scraped_pages")?;
        Ok(latest_by_created(
            state
                .scraped_pages
                .iter()
                .filter(|p| p.product_id == product_id),
            |p| p.created_at,
        )
        .cloned())
    }
}
