//! End-to-end tests for GET /funnel.

use axum_test::TestServer;
use engine_core::EventType;
use integration_tests::{fixtures, setup::TestContext};

fn server(ctx: &TestContext) -> TestServer {
    TestServer::new(ctx.router.clone()).expect("Failed to create test server")
}

#[tokio::test]
async fn staged_funnel_rates_and_drop_offs() {
    let ctx = TestContext::new();
    ctx.seed(fixtures::staged_funnel([100, 40, 40, 10]));
    let server = server(&ctx);

    let response = server
        .get("/funnel")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0]["step"], "product_view");
    assert_eq!(steps[0]["count"], 100);
    // First step has no conversion rate.
    assert!(steps[0].get("conversionRate").is_none());
    assert_eq!(steps[1]["conversionRate"], 40.0);
    assert_eq!(steps[2]["conversionRate"], 100.0);
    assert_eq!(steps[3]["conversionRate"], 25.0);

    let drop_offs = body["dropOffPoints"].as_array().unwrap();
    assert_eq!(drop_offs.len(), 3);
    assert_eq!(drop_offs[1]["fromStep"], "add_to_cart");
    assert_eq!(drop_offs[1]["toStep"], "begin_checkout");
    assert_eq!(drop_offs[1]["dropOffCount"], 0);
    assert_eq!(drop_offs[1]["dropOffRate"], 0.0);

    assert_eq!(body["totalConversionRate"], 10.0);

    // dropOffRate + next step's conversionRate is exactly 100.
    for (i, point) in drop_offs.iter().enumerate() {
        let next_conversion = steps[i + 1]["conversionRate"].as_f64().unwrap();
        let drop_off = point["dropOffRate"].as_f64().unwrap();
        assert_eq!(drop_off + next_conversion, 100.0);
    }
}

#[tokio::test]
async fn direct_buy_sessions_push_conversion_above_100() {
    let ctx = TestContext::new();
    let t0 = fixtures::ts(0, 100);
    ctx.seed(vec![
        fixtures::event(EventType::ProductView, 1, t0),
        fixtures::event(EventType::BeginCheckout, 1, t0 + 60),
        fixtures::purchase(1, t0 + 90, 100.0),
        // Sessions 2 and 3 purchase without a begin_checkout event.
        fixtures::event(EventType::ProductView, 2, t0),
        fixtures::purchase(2, t0 + 30, 100.0),
        fixtures::event(EventType::ProductView, 3, t0),
        fixtures::purchase(3, t0 + 30, 100.0),
    ]);
    let server = server(&ctx);

    let response = server
        .get("/funnel")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let steps = body["steps"].as_array().unwrap();
    // One checkout session, three purchase sessions: reported as-is.
    assert_eq!(steps[3]["conversionRate"], 300.0);
    assert_eq!(body["dropOffPoints"][2]["dropOffCount"], -2);
    assert_eq!(body["totalConversionRate"], 100.0);
}

#[tokio::test]
async fn empty_window_yields_zero_counts() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server
        .get("/funnel")
        .add_query_param("startDate", fixtures::WINDOW_START)
        .add_query_param("endDate", fixtures::WINDOW_END)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    for step in body["steps"].as_array().unwrap() {
        assert_eq!(step["count"], 0);
    }
    assert_eq!(body["totalConversionRate"], 0.0);
}

#[tokio::test]
async fn missing_range_is_rejected() {
    let ctx = TestContext::new();
    let server = server(&ctx);

    let response = server.get("/funnel").await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}
