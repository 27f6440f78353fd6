mod common;

use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};

use common::{ScriptedGateway, TestApp, ADMIN_EMAIL, ADMIN_PASSWORD};
use travelshare_api::services::gateway::GatewayError;

fn review_form(place_name: &str, place_type: &str, rating: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "Worth the trip")
        .add_text("description", "Friendly staff and a great view")
        .add_text("place_name", place_name)
        .add_text("place_type", place_type)
        .add_text("rating", rating)
        .add_text("location", "Lisbon, Portugal")
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let id = "5b0c6b3e-8f1c-4b0a-9a52-3f1f0b6f8a11";

    let response = app
        .server
        .get("/health")
        .add_header(
            header::HeaderName::from_static("x-request-id"),
            header::HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_register_signs_in_and_rejects_duplicates() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let cookie = app.register("ana@example.com").await;

    let me = app
        .server
        .get("/api/accounts/me")
        .add_header(header::COOKIE, cookie)
        .await;
    me.assert_status_ok();
    let me: Value = me.json();
    assert_eq!(me["email"], "ana@example.com");
    assert_eq!(me["is_admin"], false);

    let duplicate = app
        .server
        .post("/api/accounts/register")
        .json(&json!({
            "email": "ana@example.com",
            "password": "other",
            "full_name": "Ana Again"
        }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = duplicate.json();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Email already exists. Please use a different email."
    );
}

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;

    let wrong = app
        .server
        .post("/api/accounts/login")
        .json(&json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.json::<Value>()["message"], "Invalid email or password");

    let cookie = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let me: Value = app
        .server
        .get("/api/accounts/me")
        .add_header(header::COOKIE, cookie.clone())
        .await
        .json();
    assert_eq!(me["is_admin"], true);

    app.server
        .post("/api/accounts/logout")
        .add_header(header::COOKIE, cookie.clone())
        .await
        .assert_status_ok();

    app.server
        .get("/api/accounts/me")
        .add_header(header::COOKIE, cookie)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let response = app.server.get("/api/accounts/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_featured_and_search() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;

    let featured: Vec<Value> = app.server.get("/api/reviews/featured").await.json();
    assert_eq!(featured.len(), 2);
    assert_eq!(featured[0]["place_name"], "Sunset Beach Resort");

    let found: Vec<Value> = app
        .server
        .get("/api/reviews/search")
        .add_query_param("search", "italian")
        .add_query_param("place_type", "All Types")
        .await
        .json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["place_name"], "Mario's Trattoria");

    let none: Vec<Value> = app
        .server
        .get("/api/reviews/search")
        .add_query_param("place_type", "Restaurant")
        .add_query_param("min_rating", "5")
        .await
        .json();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_review_lifecycle() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let ana = app.register("ana@example.com").await;
    let bob = app.register("bob@example.com").await;

    let form = review_form("Casa Azul", "Hotel", "4").add_part(
        "image",
        Part::bytes(b"png-bytes".to_vec())
            .file_name("front.png")
            .mime_type("image/png"),
    );
    let created = app
        .server
        .post("/api/reviews")
        .add_header(header::COOKIE, ana.clone())
        .multipart(form)
        .await;
    created.assert_status(StatusCode::CREATED);
    let created: Value = created.json();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["author"], "ana@example.com");

    let image = created["image_path"].as_str().unwrap().to_string();
    app.server.get(&image).await.assert_status_ok();

    app.server
        .delete(&format!("/api/reviews/{}", id))
        .add_header(header::COOKIE, bob)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let dashboard: Vec<Value> = app
        .server
        .get("/api/reviews/dashboard")
        .add_header(header::COOKIE, ana.clone())
        .await
        .json();
    assert_eq!(dashboard.len(), 1);

    app.server
        .delete(&format!("/api/reviews/{}", id))
        .add_header(header::COOKIE, ana)
        .await
        .assert_status_ok();

    app.server
        .get(&format!("/api/reviews/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(!app
        .web_root
        .path()
        .join(image.trim_start_matches('/'))
        .exists());
}

#[tokio::test]
async fn test_invalid_review_rejected() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let ana = app.register("ana@example.com").await;

    app.server
        .post("/api/reviews")
        .multipart(review_form("Casa Azul", "Hotel", "4"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/api/reviews")
        .add_header(header::COOKIE, ana)
        .multipart(review_form("Casa Azul", "Hotel", "7"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.server.get("/api/reviews/featured").await.json::<Vec<Value>>().len(), 2);
}

#[tokio::test]
async fn test_html_upload_is_not_stored() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let ana = app.register("ana@example.com").await;

    let form = review_form("Casa Azul", "Hotel", "4").add_part(
        "image",
        Part::bytes(b"<script>alert(document.cookie)</script>".to_vec())
            .file_name("front.html")
            .mime_type("text/html"),
    );
    let response = app
        .server
        .post("/api/reviews")
        .add_header(header::COOKIE, ana)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid image format. Allowed: JPG, JPEG, PNG, GIF, WEBP"
    );
    assert!(!app.web_root.path().join("uploads").exists());
    assert_eq!(app.server.get("/api/reviews/featured").await.json::<Vec<Value>>().len(), 2);
}

#[tokio::test]
async fn test_admin_dashboard_sees_everything() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ana = app.register("ana@example.com").await;

    app.server
        .post("/api/reviews")
        .add_header(header::COOKIE, ana)
        .multipart(review_form("Casa Azul", "Hotel", "4"))
        .await
        .assert_status(StatusCode::CREATED);

    let all: Vec<Value> = app
        .server
        .get("/api/reviews/dashboard")
        .add_header(header::COOKIE, admin)
        .await
        .json();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_ai_recommendations_only_return_catalog_places() {
    let app = TestApp::new(ScriptedGateway::replying(
        "1. Sunset Beach Resort, 2. Eiffel Tower, 3. mario's trattoria",
    ))
    .await;

    let response = app
        .server
        .post("/api/ai/recommendations")
        .json(&json!({ "query": "sunny and tasty", "count": 3 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let names: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["place_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sunset Beach Resort", "Mario's Trattoria"]);

    let requests = app.gateway.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("Sunset Beach Resort"));
    assert_eq!(requests[0].max_tokens, 150);
}

#[tokio::test]
async fn test_ai_recommendations_validate_query() {
    let app = TestApp::new(ScriptedGateway::replying("Sunset Beach Resort")).await;

    let response = app
        .server
        .post("/api/ai/recommendations")
        .json(&json!({ "query": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Please enter a travel query");
    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_ai_recommendations_reject_out_of_range_count() {
    let app = TestApp::new(ScriptedGateway::replying("Sunset Beach Resort")).await;

    for count in [json!(0), json!(21), json!(1_000_000_000u64)] {
        let response = app
            .server
            .post("/api/ai/recommendations")
            .json(&json!({ "query": "beach", "count": count }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Count must be between 1 and 20");
    }
    assert_eq!(app.gateway.calls(), 0);

    app.server
        .post("/api/ai/recommendations")
        .json(&json!({ "query": "beach", "count": 20 }))
        .await
        .assert_status_ok();
    assert_eq!(app.gateway.calls(), 1);
}

#[tokio::test]
async fn test_malformed_json_bodies_use_error_envelope() {
    let app = TestApp::new(ScriptedGateway::replying("Sunset Beach Resort")).await;

    let empty = app.server.post("/api/ai/recommendations").await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = empty.json();
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));

    let negative = app
        .server
        .post("/api/ai/recommendations")
        .json(&json!({ "query": "beach", "count": -1 }))
        .await;
    negative.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(negative.json::<Value>()["success"], false);

    let garbled = app
        .server
        .post("/api/accounts/login")
        .text("{\"email\":")
        .content_type("application/json")
        .await;
    garbled.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(garbled.json::<Value>()["success"], false);

    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_ai_recommendations_survive_gateway_failure() {
    let app = TestApp::new(ScriptedGateway::failing(GatewayError::Timeout)).await;

    let body: Value = app
        .server
        .post("/api/ai/recommendations")
        .json(&json!({ "query": "beach" }))
        .await
        .json();
    assert_eq!(body["success"], true);
    assert!(body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_ai_chat_reports_gateway_failure() {
    let app = TestApp::new(ScriptedGateway::failing(GatewayError::Timeout)).await;

    let response = app
        .server
        .post("/api/ai/chat")
        .json(&json!({ "message": "Where should I go in May?" }))
        .await;
    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_ai_text_endpoints() {
    let app = TestApp::new(ScriptedGateway::replying("Pack light.")).await;

    let tips: Value = app
        .server
        .post("/api/ai/travel-tips")
        .json(&json!({ "destination": "Lisbon" }))
        .await
        .json();
    assert_eq!(tips["tips"], "Pack light.");
    assert_eq!(tips["destination"], "Lisbon");

    let summary: Value = app
        .server
        .post("/api/ai/reviews/1/summary")
        .await
        .json();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["summary"], "Pack light.");

    app.server
        .post("/api/ai/reviews/99/similar-places")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let probe = app.server.get("/api/ai/test").await;
    probe.assert_status_ok();
    assert!(probe.text().contains("Pack light."));
}

#[tokio::test]
async fn test_affinity_recommendations() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let ana = app.register("ana@example.com").await;

    let newcomer: Vec<Value> = app
        .server
        .get("/api/recommendations")
        .add_header(header::COOKIE, ana.clone())
        .await
        .json();
    assert_eq!(newcomer.len(), 2);

    app.server
        .post("/api/reviews")
        .add_header(header::COOKIE, ana.clone())
        .multipart(review_form("Casa Azul", "Restaurant", "4"))
        .await
        .assert_status(StatusCode::CREATED);

    let affinity: Vec<Value> = app
        .server
        .get("/api/recommendations")
        .add_header(header::COOKIE, ana)
        .await
        .json();
    assert_eq!(affinity.len(), 1);
    assert_eq!(affinity[0]["place_name"], "Mario's Trattoria");
    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_newcomer_recommendations_rank_by_rating_then_recency() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Newest review, same rating as the older seeded Mario's Trattoria
    app.server
        .post("/api/reviews")
        .add_header(header::COOKIE, admin)
        .multipart(review_form("Casa Azul", "Hotel", "4"))
        .await
        .assert_status(StatusCode::CREATED);

    let ana = app.register("ana@example.com").await;
    let newcomer: Vec<Value> = app
        .server
        .get("/api/recommendations")
        .add_header(header::COOKIE, ana)
        .await
        .json();

    let names: Vec<&str> = newcomer
        .iter()
        .map(|p| p["place_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Sunset Beach Resort", "Casa Azul", "Mario's Trattoria"]);
}

#[tokio::test]
async fn test_similar_reviews() {
    let app = TestApp::new(ScriptedGateway::replying("")).await;

    let similar: Vec<Value> = app.server.get("/api/reviews/1/similar").await.json();
    assert!(similar.iter().all(|p| p["id"] != 1));

    app.server
        .get("/api/reviews/99/similar")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
