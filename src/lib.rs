//! Meridian: Product Context MCP Server
//!
//! An MCP server that answers natural-language requests about a
//! product's AI-search visibility. Requests are routed by an LLM
//! intent classifier to three data zones (strategist, detective,
//! architect), fetched concurrently from PostgreSQL, and synthesized
//! into a grounded narrative.

pub mod alerts;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod query;
pub mod storage;
pub mod synthesis;
pub mod zones;

pub use alerts::{AlertNotifier, AlertPayload};
pub use config::{Config, TransportType};
pub use error::{
    ClassificationError, ConfigError, LlmError, MeridianError, Result, StorageError,
    SynthesisError,
};
pub use llm::{ApiTextModel, CompletionRequest, FixtureModel, TextModel};
pub use mcp::{
    create_router, run_http, run_server, run_stdio, GetContextParams, MeridianServer,
    SessionRegistry, SESSION_HEADER,
};
pub use query::{
    ArchitectData, ContextOrchestrator, FetchedData, IntentAnalysis, IntentClassifier, Zone,
    ZoneData, ZoneMetadata,
};
pub use storage::{
    create_store, Blueprint, BlueprintProvider, ContextStore, MemoryStore, PerformanceSnapshot,
    PostgresStore, Product, QueryRecord, ScrapedPage,
};
pub use synthesis::{SynthesisRequest, Synthesizer};
pub use zones::ZoneFetcher;
