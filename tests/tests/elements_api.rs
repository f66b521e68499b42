//! End-to-end tests for GET /elements.

use axum_test::TestServer;
use engine_core::{DeviceType, EventType};
use integration_tests::{fixtures, setup::TestContext};

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

#[tokio::test]
async fn ranks_elements_on_a_route() {
    let ctx = TestContext::new();
    let t0 = fixtures::ts(0, 100);
    ctx.seed(vec![
        fixtures::interaction(EventType::Click, 1, t0, "/buy/1", "#add-to-cart"),
        fixtures::interaction(EventType::Click, 2, t0 + 10, "/buy/1", "#add-to-cart"),
        fixtures::interaction(EventType::Hover, 1, t0 + 20, "/buy/1", "#add-to-cart"),
        fixtures::interaction(EventType::Click, 1, t0 + 30, "/buy/1", ".gallery"),
        // Different route; must not leak in.
        fixtures::interaction(EventType::Click, 1, t0 + 40, "/other", "#add-to-cart"),
    ]);
    let server = server(&ctx);

    let response = server
        .get("/elements")
        .add_query_param("route", "/buy/1")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["route"], "/buy/1");
    let elements = body["elements"].as_array().unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0]["selector"], "#add-to-cart");
    assert_eq!(elements[0]["interactions"], 3);
    assert_eq!(elements[0]["clicks"], 2);
    assert_eq!(elements[0]["hovers"], 1);
    assert_eq!(body["summary"]["totalInteractions"], 4);
    assert_eq!(body["summary"]["uniqueElements"], 2);
    assert_eq!(body["summary"]["topSelector"], "#add-to-cart");
}

#[tokio::test]
async fn device_filter_narrows_interactions() {
    let ctx = TestContext::new();
    let t0 = fixtures::ts(0, 100);
    let mut mobile = fixtures::interaction(EventType::Click, 1, t0, "/buy/1", "#cta");
    mobile.device_type = Some(DeviceType::Mobile);
    let mut desktop = fixtures::interaction(EventType::Click, 2, t0 + 10, "/buy/1", "#cta");
    desktop.device_type = Some(DeviceType::Desktop);
    ctx.seed(vec![mobile, desktop]);
    let server = server(&ctx);

    let response = server
        .get("/elements")
        .add_query_param("route", "/buy/1")
        .add_query_param("device", "mobile")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["device"], "mobile");
    assert_eq!(body["elements"][0]["interactions"], 1);
}

#[tokio::test]
async fn missing_route_is_rejected() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/elements")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn unknown_device_is_rejected() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/elements")
        .add_query_param("route", "/buy/1")
        .add_query_param("device", "smartwatch")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_bad_request();
}
