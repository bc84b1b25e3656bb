//! Types for the intent-driven context pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Blueprint, PerformanceSnapshot, QueryRecord, ScrapedPage};

// ============================================================================
// Zones
// ============================================================================

/// A logical data domain a request may need.
///
/// The set is closed; there is no dynamic registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Aggregate performance/score snapshot, one row per product.
    Strategist,
    /// Query-level outcome records, many rows per product.
    Detective,
    /// Optimization/blueprint artifacts from up to three sub-sources.
    Architect,
}

impl Zone {
    /// All zones, in canonical order.
    pub const ALL: [Zone; 3] = [Zone::Strategist, Zone::Detective, Zone::Architect];

    /// Get a human-readable name for this zone.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Strategist => "strategist",
            Self::Detective => "detective",
            Self::Architect => "architect",
        }
    }

    /// One-line semantics, as described to the classifier model.
    pub fn semantics(&self) -> &'static str {
        match self {
            Self::Strategist => {
                "overall performance: visibility score, mention totals, average \
                 position, summary of the latest analysis run"
            }
            Self::Detective => {
                "individual query outcomes: which tracked queries mentioned the \
                 product, where it ranked, what the answer engines said"
            }
            Self::Architect => {
                "optimization material: provider-generated improvement blueprints \
                 and scraped page content for the product's site"
            }
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Intent analysis
// ============================================================================

/// Structured decision produced by the intent classifier.
///
/// `zones` is never empty for a well-formed classification; the
/// classifier fails rather than returning an empty set. Order reflects
/// classifier emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentAnalysis {
    /// Zones the request needs, in emission order.
    pub zones: Vec<Zone>,
    /// Optional keyword filter extracted from the request.
    #[serde(default)]
    pub query_filter: Option<String>,
    /// The classifier's explanation of its routing decision.
    pub reasoning: String,
    /// What the answer should focus on.
    pub primary_focus: String,
}

// ============================================================================
// Fetched data
// ============================================================================

/// Zone-specific payload inside a [`FetchedData`] envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ZoneData {
    Strategist(PerformanceSnapshot),
    Detective(Vec<QueryRecord>),
    Architect(ArchitectData),
}

/// Composite architect payload: whichever sub-sources had a row.
#[derive(Debug, Clone, Serialize)]
pub struct ArchitectData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_blueprint: Option<Blueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_blueprint: Option<Blueprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraped_page: Option<ScrapedPage>,
}

impl ArchitectData {
    /// Number of present sub-sources (0-3).
    pub fn present_count(&self) -> usize {
        [
            self.openai_blueprint.is_some(),
            self.gemini_blueprint.is_some(),
            self.scraped_page.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }

    /// Timestamp of the first present sub-source in the fixed
    /// preference order OpenAI, Gemini, scraped.
    pub fn latest_date(&self) -> Option<DateTime<Utc>> {
        self.openai_blueprint
            .as_ref()
            .map(|b| b.created_at)
            .or_else(|| self.gemini_blueprint.as_ref().map(|b| b.created_at))
            .or_else(|| self.scraped_page.as_ref().map(|p| p.created_at))
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

/// Per-zone envelope metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneMetadata {
    /// Records in the payload; at least 1 for a present envelope.
    pub record_count: usize,
    /// Most relevant timestamp for the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<DateTime<Utc>>,
    /// The keyword filter actually applied, echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_filter: Option<String>,
}

/// Normalized result of one zone fetch.
///
/// Fetchers return either a populated envelope (record count ≥ 1) or
/// nothing; an empty-but-present envelope is never constructed.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedData {
    pub zone: Zone,
    pub data: ZoneData,
    pub metadata: ZoneMetadata,
}
