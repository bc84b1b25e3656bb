//! Storage trait definitions and record types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A tracked product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Product website URL
    pub url: Option<String>,
    /// Owning user
    pub user_id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Aggregate performance snapshot, one row per analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub id: String,
    pub product_id: String,
    /// Overall AI-search visibility score (0-100).
    pub visibility_score: f64,
    /// Queries checked in this run.
    pub total_queries: i64,
    /// Queries where the product was mentioned.
    pub mentions: i64,
    /// Average ranking position across mentions, if any.
    pub avg_position: Option<f64>,
    /// Short prose summary of the run.
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one tracked query against one answer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub product_id: String,
    /// The query text that was checked.
    pub query_text: String,
    /// Answer engine the query ran against.
    pub engine: String,
    /// Whether the product appeared in the answer.
    pub mentioned: bool,
    /// Position within the answer, when mentioned.
    pub position: Option<i32>,
    /// Snippet of the engine's answer.
    pub response_snippet: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Optimization blueprint generated by one LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: String,
    pub product_id: String,
    pub title: String,
    /// Blueprint body (markdown).
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Scraped page content for a product's site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub id: String,
    pub product_id: String,
    pub url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Which provider-specific blueprint table to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlueprintProvider {
    OpenAi,
    Gemini,
}

impl BlueprintProvider {
    /// Backing table name. The set is closed; never interpolate user
    /// input here.
    pub fn table(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai_blueprints",
            Self::Gemini => "gemini_blueprints",
        }
    }
}

/// Trait for context storage backends.
///
/// Every read is equality-filtered on product id and ordered by
/// descending recency; "no rows" is `None`/empty, never an error.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Look up a product by id.
    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, StorageError>;

    /// Most recent performance snapshot for a product.
    async fn latest_snapshot(
        &self,
        product_id: &str,
    ) -> Result<Option<PerformanceSnapshot>, StorageError>;

    /// Query records for a product, most recent first, bounded by
    /// `limit`. With `filter`, only records whose query text contains
    /// it as a case-insensitive substring.
    async fn query_records(
        &self,
        product_id: &str,
        filter: Option<&str>,
        limit: u32,
    ) -> Result<Vec<QueryRecord>, StorageError>;

    /// Most recent blueprint for a product from one provider table.
    async fn latest_blueprint(
        &self,
        product_id: &str,
        provider: BlueprintProvider,
    ) -> Result<Option<Blueprint>, StorageError>;

    /// Most recent scraped page for a product.
    async fn latest_scraped_page(
        &self,
        product_id: &str,
    ) -> Result<Option<ScrapedPage>, StorageError>;
}
