//! End-to-end tests for GET /metrics.
//!
//! The full router runs over a mock event store, so every production code
//! path except the ClickHouse wire transport is exercised.

use axum_test::TestServer;
use integration_tests::{
    fixtures,
    mocks::FailureMode,
    setup::TestContext,
};

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

#[tokio::test]
async fn storefront_scenario_metrics() {
    let ctx = TestContext::new();
    ctx.seed(fixtures::storefront_scenario());
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["ecommerce"]["productViews"], 10);
    assert_eq!(body["ecommerce"]["cartAdditions"], 4);
    assert_eq!(body["ecommerce"]["checkoutStarts"], 2);
    assert_eq!(body["ecommerce"]["checkoutCompletions"], 1);
    assert_eq!(body["ecommerce"]["conversionRate"], 10.0);
    assert_eq!(body["ecommerce"]["cartAbandonmentRate"], 50.0);
    assert_eq!(body["ecommerce"]["totalRevenue"], 1000.0);

    assert_eq!(body["engagement"]["uniqueSessions"], 10);
    assert_eq!(body["period"]["startDate"], fixtures::WINDOW_START);
    assert_eq!(body["period"]["endDate"], fixtures::WINDOW_END);

    // First query is a miss; no cached marker.
    assert!(body.get("cached").is_none());
    // Standard queries carry no advanced groups.
    assert!(body.get("devices").is_none());
    assert!(body.get("retention").is_none());
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let ctx = TestContext::new();
    ctx.seed(fixtures::storefront_scenario());
    let server = server(&ctx);

    let first: serde_json::Value = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await
        .json();
    assert_eq!(ctx.store.query_count(), 1);

    let second = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;
    second.assert_status_ok();
    let second: serde_json::Value = second.json();

    // Cache hit: the store was not queried again and the payload is
    // identical to the fresh computation.
    assert_eq!(ctx.store.query_count(), 1);
    assert_eq!(second["cached"], true);
    assert_eq!(first["ecommerce"], second["ecommerce"]);
    assert_eq!(first["engagement"], second["engagement"]);
    assert_eq!(first["trends"], second["trends"]);
}

#[tokio::test]
async fn cache_hit_survives_a_store_outage() {
    let ctx = TestContext::new();
    ctx.seed(fixtures::storefront_scenario());
    let server = server(&ctx);

    server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await
        .assert_status_ok();

    ctx.store.set_failure(FailureMode::Upstream);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["cached"], true);
}

#[tokio::test]
async fn advanced_flag_adds_the_advanced_groups() {
    let ctx = TestContext::new();
    ctx.seed(fixtures::storefront_scenario());
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .add_query_param("advanced", "true")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["devices"]["devices"].is_array());
    assert!(body["categories"]["distribution"].is_array());
    assert!(body["behavior"]["bounceRate"].is_number());
    assert!(body["retention"]["retentionRate"].is_number());
}

#[tokio::test]
async fn comparison_reports_plus_100_from_a_zero_baseline() {
    let ctx = TestContext::new();
    // All activity is in the current window; the previous week is empty.
    ctx.seed(fixtures::storefront_scenario());
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .add_query_param("compare", "true")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let comparison = &body["comparison"];
    // Previous period: the 7 days immediately before the window.
    assert_eq!(comparison["previousPeriod"]["startDate"], "2026-02-22");
    assert_eq!(comparison["previousPeriod"]["endDate"], "2026-02-28");
    assert_eq!(comparison["previousPeriod"]["ecommerce"]["productViews"], 0);

    assert_eq!(comparison["changes"]["productViews"], 100.0);
    assert_eq!(comparison["changes"]["totalRevenue"], 100.0);
    assert_eq!(comparison["changes"]["uniqueUsers"], 100.0);
}

#[tokio::test]
async fn user_filter_narrows_the_event_set() {
    let ctx = TestContext::new();
    let mut events = fixtures::storefront_scenario();
    for e in &mut events {
        if e.session_hash == 0 {
            e.user_id = Some("user-a".into());
        }
    }
    ctx.seed(events);
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .add_query_param("userId", "user-a")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    // Session 0 contributed one event of each funnel stage.
    assert_eq!(body["ecommerce"]["productViews"], 1);
    assert_eq!(body["ecommerce"]["checkoutCompletions"], 1);
    assert_eq!(body["engagement"]["uniqueSessions"], 1);
}

#[tokio::test]
async fn missing_start_date_is_rejected() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
    assert!(body["timestamp"].is_number());
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_END)
        .add_query_param("endDate", fixtures::WINDOW_START)
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn store_outage_maps_to_502() {
    let ctx = TestContext::new();
    ctx.store.set_failure(FailureMode::Upstream);
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_001");
}

#[tokio::test]
async fn store_timeout_maps_to_504() {
    let ctx = TestContext::new();
    ctx.store.set_failure(FailureMode::Timeout);
    let server = server(&ctx);

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status(axum::http::StatusCode::GATEWAY_TIMEOUT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_002");
}

#[tokio::test]
async fn failed_computation_is_not_cached() {
    let ctx = TestContext::new();
    ctx.store.set_failure(FailureMode::Upstream);
    let server = server(&ctx);

    server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await
        .assert_status(axum::http::StatusCode::BAD_GATEWAY);

    // Store recovers; the next query must recompute, not serve a cached
    // failure.
    ctx.store.set_failure(FailureMode::None);
    ctx.seed(fixtures::storefront_scenario());

    let response = server
        .get("/metrics")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body.get("cached").is_none());
    assert_eq!(body["ecommerce"]["productViews"], 10);
}
