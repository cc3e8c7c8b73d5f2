use axum::http::StatusCode;
use godown_core::config::GodownConfig;
use godown_server::state::AppState;
use http_body_util::BodyExt;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_state() -> AppState {
    AppState::new(GodownConfig::default())
}

fn router(state: &AppState) -> axum::Router {
    godown_server::build_router_with_state(state.clone())
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn chat(state: &AppState, user: &str, message: &str) -> serde_json::Value {
    let (status, json) = post_json(
        router(state),
        "/api/chat",
        serde_json::json!({ "message": message, "user_id": user }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "chat failed: {json}");
    json
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let state = app_state();
    let (status, json) = get(router(&state), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn chat_requires_user_id() {
    let state = app_state();
    let (status, _) = post_json(
        router(&state),
        "/api/chat",
        serde_json::json!({ "message": "hello", "user_id": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_general_message_passes_through() {
    let state = app_state();
    let json = chat(&state, "u1", "namaste!").await;
    assert_eq!(json["intent"], "general");
    assert_eq!(json["confidence"], "low");
    assert_eq!(json["success"], true);
    assert!(json.get("reply").is_none() || json["reply"].is_null());
}

#[tokio::test]
async fn chat_consent_flow_creates_warehouse_and_lot() {
    let state = app_state();

    let json = chat(&state, "u1", "add a warehouse called Central in Nashik").await;
    assert_eq!(json["intent"], "add_warehouse");
    assert_eq!(json["requires_consent"], true);

    let json = chat(&state, "u1", "yes").await;
    assert_eq!(json["intent"], "confirm_action");
    assert_eq!(json["success"], true);

    let json = chat(&state, "u1", "Add 200 quintals of Onion").await;
    assert_eq!(json["intent"], "add_lot");
    assert_eq!(json["requires_consent"], true);
    let prompt = json["reply"].as_str().unwrap();
    assert!(prompt.contains("Onion") && prompt.contains("200"), "{prompt}");

    let json = chat(&state, "u1", "yes").await;
    assert_eq!(json["success"], true);
    let reply = json["reply"].as_str().unwrap();
    assert!(reply.contains("LOT-"), "{reply}");

    // The lot is visible through the direct persistence route.
    let (status, lots) = get(router(&state), "/api/lots?user_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    let lots = lots.as_array().unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0]["crop"], "Onion");
    assert_eq!(lots[0]["quantity_quintals"], 200.0);

    // And the facility's used capacity moved.
    let (_, facilities) = get(router(&state), "/api/facilities?user_id=u1").await;
    assert_eq!(facilities[0]["used_capacity_quintals"], 200.0);
}

#[tokio::test]
async fn chat_second_confirm_finds_nothing_pending() {
    let state = app_state();
    chat(&state, "u1", "add a warehouse called Central").await;
    let first = chat(&state, "u1", "yes").await;
    assert_eq!(first["success"], true);
    let second = chat(&state, "u1", "yes").await;
    assert_eq!(second["success"], false);
}

#[tokio::test]
async fn chat_view_summary_for_new_user_suggests_onboarding() {
    let state = app_state();
    let json = chat(&state, "fresh-user", "give me a summary").await;
    assert_eq!(json["intent"], "view_summary");
    assert_eq!(json["success"], true);
    let context = json["context"].as_str().unwrap();
    assert!(context.contains("add a warehouse"), "{context}");
}

#[tokio::test]
async fn create_and_list_facilities_directly() {
    let state = app_state();
    let (status, created) = post_json(
        router(&state),
        "/api/facilities",
        serde_json::json!({
            "user_id": "u1",
            "name": "North Shed",
            "kind": "cold",
            "city": "Pune",
            "capacity_quintals": 800.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "North Shed");
    assert_eq!(created["kind"], "cold");

    let (status, list) = get(router(&state), "/api/facilities?user_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["city"], "Pune");
    assert_eq!(list[0]["capacity_quintals"], 800.0);
}

#[tokio::test]
async fn create_facility_rejects_unknown_kind() {
    let state = app_state();
    let (status, _) = post_json(
        router(&state),
        "/api/facilities",
        serde_json::json!({
            "user_id": "u1",
            "name": "Weird",
            "kind": "underwater"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_facility_applies_defaults() {
    let state = app_state();
    let (status, created) = post_json(
        router(&state),
        "/api/facilities",
        serde_json::json!({ "user_id": "u1", "name": "Plain" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["kind"], "dry");
    assert_eq!(created["capacity_quintals"], 500.0);
    assert_eq!(created["city"], "Unknown");
}

#[tokio::test]
async fn summary_route_aggregates() {
    let state = app_state();
    chat(&state, "u1", "add a warehouse called Central in Nashik").await;
    chat(&state, "u1", "yes").await;
    chat(&state, "u1", "add 50 quintals of wheat").await;
    chat(&state, "u1", "yes").await;

    let (status, json) = get(router(&state), "/api/summary?user_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["facility_count"], 1);
    assert_eq!(json["lot_count"], 1);
    assert_eq!(json["used_capacity_quintals"], 50.0);
    assert_eq!(json["unresolved_alerts"], 0);
}

#[tokio::test]
async fn alerts_route_empty_for_new_user() {
    let state = app_state();
    let (status, json) = get(router(&state), "/api/alerts?user_id=u1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}
