use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use rentbuy::api::router;

async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, cache_control, body.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    let (status, _, body) = send(request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn column(json: &Value, key: &str) -> Vec<f64> {
    json["series"][key]
        .as_array()
        .unwrap_or_else(|| panic!("missing series {key}"))
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn index_page_embeds_controls_and_default_projection() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, cache_control, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("no-store"));

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<canvas id=\"chart\""));
    assert!(html.contains("\"homePrice\""));
    assert!(html.contains("\"renterNetWorth\""));
    assert!(!html.contains("{{BOOTSTRAP_JSON}}"));
}

#[tokio::test]
async fn static_assets_are_served_with_content_types() {
    for (uri, content_type) in [
        ("/styles.css", "text/css; charset=utf-8"),
        ("/app.js", "application/javascript; charset=utf-8"),
    ] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            content_type
        );
    }
}

#[tokio::test]
async fn controls_endpoint_lists_every_parameter() {
    let (status, json) = get_json("/api/controls").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["defaultHorizonMonths"], 120);

    let keys: Vec<&str> = json["controls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["key"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        [
            "homePrice",
            "rent",
            "income",
            "downPaymentPct",
            "interestRate",
            "appreciationRate",
            "investmentReturn",
            "maintenanceRate",
        ]
    );
}

#[tokio::test]
async fn default_projection_over_get() {
    let (status, json) = get_json("/api/project").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["horizonMonths"], 120);
    assert_eq!(json["months"].as_array().unwrap().len(), 120);

    let home_equity = column(&json, "homeEquity");
    let investments = column(&json, "buyerInvestmentEquity");
    let buyer = column(&json, "buyerNetWorth");
    assert_eq!(home_equity.len(), 120);
    for i in 0..120 {
        assert!((buyer[i] - (home_equity[i] + investments[i])).abs() < 1e-6);
    }
    assert!((home_equity[0] - 36_000.0).abs() < 1e-6);
    assert!((column(&json, "renterNetWorth")[0] - 69_000.0).abs() < 1e-6);
}

#[tokio::test]
async fn query_parameters_override_defaults() {
    let (status, json) = get_json("/api/project?interestRate=0&homePrice=360&horizonMonths=24").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["horizonMonths"], 24);
    assert_eq!(json["params"]["homePrice"], 360.0);

    // 15% down on 360k leaves 306k financed, repaid straight-line.
    let payment = json["derived"]["monthlyMortgagePayment"].as_f64().unwrap();
    assert!((payment - 306_000.0 / 360.0).abs() < 1e-6);
    assert_eq!(column(&json, "renterSavings").len(), 24);
}

#[tokio::test]
async fn post_projection_matches_get() {
    let (_, from_get) = get_json("/api/project?rent=3100&investmentReturn=6").await;
    let (status, from_post) =
        post_json("/api/project", json!({ "rent": 3100, "investmentReturn": 6 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from_get["series"], from_post["series"]);
    assert_eq!(from_get["summary"], from_post["summary"]);
}

#[tokio::test]
async fn out_of_range_parameter_is_rejected() {
    let (status, json) = post_json("/api/project", json!({ "downPaymentPct": 150 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("downPaymentPct must be between 0 and 100")
    );
}

#[tokio::test]
async fn zero_horizon_is_rejected() {
    let (status, json) = get_json("/api/project?horizonMonths=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("horizonMonths"));
}

#[tokio::test]
async fn unknown_route_returns_json_404() {
    let (status, json) = get_json("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn unparsable_query_gets_json_error_and_no_store() {
    let request = Request::builder()
        .uri("/api/project?horizonMonths=1.5")
        .body(Body::empty())
        .unwrap();
    let (status, cache_control, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn malformed_post_body_gets_json_error_and_no_store() {
    for body in [r#"{"rent":"x"}"#, "{not json"] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/project")
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, cache_control, bytes) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(cache_control.as_deref(), Some("no-store"));
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].is_string(), "{body}");
    }
}

#[tokio::test]
async fn control_bounds_are_inclusive() {
    for price in ["200", "1000"] {
        let (status, json) = get_json(&format!("/api/project?homePrice={price}")).await;
        assert_eq!(status, StatusCode::OK, "homePrice={price}");
        assert_eq!(json["params"]["homePrice"], price.parse::<f64>().unwrap());
    }

    let (status, json) = get_json("/api/project?homePrice=199.99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("homePrice must be between 200 and 1000")
    );
}

#[tokio::test]
async fn nan_query_value_is_rejected() {
    let request = Request::builder()
        .uri("/api/project?rent=NaN")
        .body(Body::empty())
        .unwrap();
    let (status, cache_control, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(cache_control.as_deref(), Some("no-store"));
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "rent must be a finite number");
}

#[tokio::test]
async fn chart_script_plots_home_value_and_reports_renter_savings() {
    let request = Request::builder().uri("/app.js").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    let script = String::from_utf8(body).unwrap();
    assert!(script.contains(r#"key: "homeValue""#));
    assert!(script.contains("series.renterSavings"));

    let (_, json) = get_json("/api/project?horizonMonths=3").await;
    let home_value = column(&json, "homeValue");
    assert_eq!(home_value.len(), 3);
    assert!((home_value[0] - 450_000.0).abs() < 1e-6);
}
