use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sitewatch_server::{api, config::FeedConfig, seed::SeedData};
use tower::ServiceExt;

fn app() -> (Router, api::AppState) {
    let (state, _task) = api::AppState::spawn(SeedData::demo(), &FeedConfig::default()).unwrap();
    (api::router(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_pending_tab_lists_open_alerts() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/alerts?tab=pending")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["alerts"]), vec!["ALT-20251211-001", "ALT-20251211-002"]);
    assert_eq!(body["pending_badge"], 1);
    assert_eq!(body["connection"]["label"], "NETWORK: STABLE");
}

#[tokio::test]
async fn test_empty_search_renders_empty_state() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/alerts?search=nothing-matches")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["alerts"].as_array().unwrap().is_empty());
    assert_eq!(body["empty_message"], "暂无相关报警记录");
}

#[tokio::test]
async fn test_unknown_alert_is_404() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/alerts/ALT-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_operator_workflow() {
    let (app, _) = app();

    let (status, body) = send(&app, post("/api/alerts/ALT-20251211-001/resolve", json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, body) = send(&app, post("/api/alerts/ALT-20251211-001/acknowledge", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "processing");

    let (status, body) = send(&app, post("/api/alerts/ALT-20251211-001/false-positive", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "resolved-false-positive");

    // Replies are sent after the new snapshot is published.
    let (_, body) = send(&app, get("/api/alerts?tab=resolved")).await;
    assert!(ids(&body["alerts"]).contains(&"ALT-20251211-001".to_string()));
}

#[tokio::test]
async fn test_feed_ingest_and_disconnect() {
    let (app, state) = app();
    let mut snapshots = state.snapshots.clone();

    let record = json!({
        "id": "ALT-20251211-008",
        "severity": "critical",
        "title": "未佩戴安全帽",
        "location": "基坑西侧",
        "occurred_at": "2025-12-11T15:02:00Z",
        "status": "pending"
    });
    let (status, _) = send(&app, post("/api/feed/alerts", record)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    snapshots.changed().await.unwrap();
    let (status, body) = send(&app, get("/api/alerts/ALT-20251211-008")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "基坑西侧");

    let (status, _) = send(&app, post("/api/feed/status", json!({"connected": false, "reason": "upstream reset"}))).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    snapshots.changed().await.unwrap();
    let (_, body) = send(&app, get("/api/alerts")).await;
    assert_eq!(body["connection"]["state"], "down");
    assert_eq!(body["connection"]["stale"], true);
    assert_eq!(body["alerts"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_malformed_feed_record_is_rejected() {
    let (app, _) = app();
    let record = json!({
        "id": "ALT-X",
        "severity": "catastrophic",
        "title": "未知",
        "location": "大门入口",
        "occurred_at": "2025-12-11T15:02:00Z",
        "status": "pending"
    });
    let (status, body) = send(&app, post("/api/feed/alerts", record)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_RECORD");
}

#[tokio::test]
async fn test_custom_report_uses_requested_range() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/reports?period=custom&from=2025-12-10&to=2025-12-10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kpi"]["total"], 2);
    assert_eq!(body["kpi"]["rate"], 100.0);
    assert_eq!(body["trend"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/api/reports?period=week&as_of=2025-12-11")).await;
    assert_eq!(body["kpi"]["total"], 8);
    assert_eq!(body["kpi"]["top_type"], "未佩戴安全帽");

    let (_, body) = send(&app, get("/api/reports?period=week&as_of=2025-12-11&team=%E9%92%A2%E7%AD%8B%E5%B7%A5%E4%B8%89%E7%BB%84")).await;
    assert_eq!(body["kpi"]["total"], 2);

    let (status, body) = send(&app, get("/api/reports?period=custom&from=2025-12-11&to=2025-12-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PERIOD");
}

#[tokio::test]
async fn test_report_area_and_type_selectors() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/reports?period=week&as_of=2025-12-11&area=%E5%9F%BA%E5%9D%91%E4%B8%9C%E4%BE%A7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kpi"]["total"], 1);
    assert_eq!(body["area"], "基坑东侧");

    let (_, body) = send(&app, get("/api/reports?period=week&as_of=2025-12-11&type=%E6%9C%AA%E4%BD%A9%E6%88%B4%E5%AE%89%E5%85%A8%E5%B8%BD&area=all")).await;
    assert_eq!(body["kpi"]["total"], 2);
    assert_eq!(body["kpi"]["top_type_share"], 100.0);
    assert_eq!(body["area"], Value::Null);
}

#[tokio::test]
async fn test_report_dates_at_calendar_floor() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/reports?period=week&as_of=-262143-01-03")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PERIOD");

    // The server keeps answering afterwards.
    let (status, _) = send(&app, get("/api/reports?period=week&as_of=2025-12-11")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bad_query_values_render_json_errors() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/reports?period=custom&from=2025-13-01&to=2025-12-02")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PERIOD");

    let (status, body) = send(&app, get("/api/video-wall?size=300")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_GRID_SIZE");

    let (status, body) = send(&app, get("/api/alerts?tab=bogus")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_RECORD");

    let (status, body) = send(&app, get("/api/map?width=wide")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_RECORD");
}

#[tokio::test]
async fn test_feed_body_that_is_not_json() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/feed/alerts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_RECORD");
}

#[tokio::test]
async fn test_video_wall_slots() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/video-wall?size=4&selected=CAM-03")).await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots.iter().filter(|s| s["slot"] == "empty").count(), 7);
    assert_eq!(slots[2]["selected"], true);
    assert_eq!(slots[2]["alarm"], true);
    assert_eq!(slots[15]["channel"], "CH-16");

    let (_, body) = send(&app, get("/api/video-wall?size=2&selected=CAM-09")).await;
    assert_eq!(body["selected"], Value::Null);

    let (status, body) = send(&app, get("/api/video-wall?size=5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_GRID_SIZE");
}

#[tokio::test]
async fn test_map_projection() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/api/map?width=800&height=600")).await;

    assert_eq!(status, StatusCode::OK);
    let first = &body["markers"][0];
    assert_eq!(first["position"]["left"], 160.0);
    assert_eq!(first["position"]["top"], 180.0);
    assert_eq!(body["legend"]["by_kind"]["camera"], 3);
}

#[tokio::test]
async fn test_overview_and_health() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/api/overview")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["open_alerts"], 2);
    assert_eq!(body["stats"]["cameras_total"], 9);
    assert_eq!(body["navigation"][1]["path"], "/video-wall");

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
