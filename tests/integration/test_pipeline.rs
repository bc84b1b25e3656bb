//! End-to-end pipeline scenarios.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use meridian::{
    Blueprint, BlueprintProvider, Config, FixtureModel, GetContextParams, MemoryStore,
    MeridianServer, PerformanceSnapshot, Product, QueryRecord,
};

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .add_product(Product {
            id: "prod-1".to_string(),
            name: "Acme CRM".to_string(),
            url: Some("https://acme.example".to_string()),
            user_id: "user-42".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap(),
        })
        .await;
    store
}

fn params(intent: &str) -> GetContextParams {
    GetContextParams {
        product_id: "prod-1".to_string(),
        intent: intent.to_string(),
        query_filter: None,
    }
}

#[tokio::test]
async fn test_performance_question_routes_to_strategist() {
    let store = seeded_store().await;
    store
        .add_snapshot(PerformanceSnapshot {
            id: "snap-1".to_string(),
            product_id: "prod-1".to_string(),
            visibility_score: 68.0,
            total_queries: 40,
            mentions: 17,
            avg_position: Some(2.2),
            summary: Some("Steady improvement".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 7, 20, 8, 0, 0).unwrap(),
        })
        .await;

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["strategist"],
        "reasoning": "The user asks about overall performance.",
        "primary_focus": "visibility score"
    }));
    model.push_text("Acme CRM sits at a visibility score of 68.");

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server
        .get_context_text(&params("How is my product performing?"))
        .await;

    assert!(text.starts_with("Acme CRM sits at a visibility score of 68."));
    assert!(text.contains("Data sources: strategist (1 records)"));
    assert!(text.contains("Latest analysis: 2026-07-20T08:00:00+00:00"));
}

#[tokio::test]
async fn test_lost_query_routes_to_detective_with_filter() {
    let store = seeded_store().await;
    // 15 matching records; the filtered read caps at 10.
    for i in 0..15 {
        store
            .add_query_record(QueryRecord {
                id: format!("qr-{i}"),
                product_id: "prod-1".to_string(),
                query_text: "best CRM for startups".to_string(),
                engine: "chatgpt".to_string(),
                mentioned: i % 2 == 0,
                position: if i % 2 == 0 { Some(3) } else { None },
                response_snippet: None,
                created_at: Utc.with_ymd_and_hms(2026, 7, 19, 9, i, 0).unwrap(),
            })
            .await;
    }

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["detective"],
        "query_filter": "best CRM",
        "reasoning": "The user asks about one tracked query.",
        "primary_focus": "why the product dropped from a query"
    }));
    model.push_text("You lost 'best CRM' in half of the recent checks.");

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server
        .get_context_text(&params("Why did I lose 'best CRM'?"))
        .await;

    assert!(text.contains("detective (10 records)"));
    assert!(text.contains("Query filter: \"best CRM\""));
}

#[tokio::test]
async fn test_missing_product_skips_classification() {
    let store = Arc::new(MemoryStore::new());
    // An exhausted fixture fails any classification attempt, so the
    // clean not-found message proves the classifier never ran.
    let server = MeridianServer::new(Config::default(), store, Arc::new(FixtureModel::new()));

    let text = server
        .get_context_text(&params("How is my product performing?"))
        .await;
    assert_eq!(text, "Product not found: prod-1");
}

#[tokio::test]
async fn test_partial_zone_data_still_synthesizes() {
    let store = seeded_store().await;
    // Strategist has nothing; architect has one blueprint.
    store
        .add_blueprint(
            BlueprintProvider::OpenAi,
            Blueprint {
                id: "bp-1".to_string(),
                product_id: "prod-1".to_string(),
                title: "Comparison content plan".to_string(),
                content: "## Add comparison pages".to_string(),
                created_at: Utc.with_ymd_and_hms(2026, 7, 15, 0, 0, 0).unwrap(),
            },
        )
        .await;

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["strategist", "architect"],
        "reasoning": "Improvement question needs both zones.",
        "primary_focus": "optimization steps"
    }));
    model.push_text("Apply the blueprint below.");

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server.get_context_text(&params("How do I improve?")).await;

    // One absent zone never fails the call; only architect is listed.
    assert!(text.contains("Data sources: architect (1 records)"));
    assert!(!text.contains("strategist ("));
}

#[tokio::test]
async fn test_explicit_filter_overrides_classifier() {
    let store = seeded_store().await;
    store
        .add_query_record(QueryRecord {
            id: "qr-1".to_string(),
            product_id: "prod-1".to_string(),
            query_text: "best CRM overall".to_string(),
            engine: "perplexity".to_string(),
            mentioned: true,
            position: Some(1),
            response_snippet: None,
            created_at: Utc.with_ymd_and_hms(2026, 7, 19, 9, 0, 0).unwrap(),
        })
        .await;

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["detective"],
        "query_filter": "project tools",
        "reasoning": "Query-level question.",
        "primary_focus": "query outcomes"
    }));
    model.push_text("One check matched.");

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server
        .get_context_text(&GetContextParams {
            product_id: "prod-1".to_string(),
            intent: "What happened with that query?".to_string(),
            query_filter: Some("best CRM".to_string()),
        })
        .await;

    // The classifier's filter matches nothing; the explicit override
    // is the one echoed back.
    assert!(text.contains("detective (1 records)"));
    assert!(text.contains("Query filter: \"best CRM\""));
}

#[tokio::test]
async fn test_no_data_message_lists_zones() {
    let store = seeded_store().await;

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["strategist", "detective", "architect"],
        "reasoning": "Broad question.",
        "primary_focus": "everything"
    }));

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server.get_context_text(&params("Tell me everything")).await;

    assert!(text.contains("No data available for \"Acme CRM\""));
    assert!(text.contains("strategist, detective, architect"));
}

#[tokio::test]
async fn test_synthesis_failure_is_system_error() {
    let store = seeded_store().await;
    store
        .add_snapshot(PerformanceSnapshot {
            id: "snap-1".to_string(),
            product_id: "prod-1".to_string(),
            visibility_score: 50.0,
            total_queries: 10,
            mentions: 2,
            avg_position: None,
            summary: None,
            created_at: Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap(),
        })
        .await;

    let model = FixtureModel::new();
    model.push_structured(serde_json::json!({
        "zones": ["strategist"],
        "reasoning": "Performance question.",
        "primary_focus": "score"
    }));
    // No text response queued: the generation call fails.

    let server = MeridianServer::new(Config::default(), store, Arc::new(model));
    let text = server.get_context_text(&params("How are we doing?")).await;

    assert!(text.contains("A system error occurred"));
}
