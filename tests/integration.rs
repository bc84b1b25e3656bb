//! Integration tests for the Meridian MCP server.
//!
//! These exercise the full pipeline (classification, orchestration,
//! synthesis) against the in-memory store and the fixture-replay
//! model, and the session-multiplexed HTTP transport against the axum
//! router directly. No network, database, or live model is required.

#[path = "integration/test_pipeline.rs"]
mod test_pipeline;

#[path = "integration/test_sessions.rs"]
mod test_sessions;
