use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::{JsonBody, RequestId},
    services::recommendations::{DEFAULT_RECOMMENDATION_COUNT, MAX_RECOMMENDATION_COUNT},
    state::AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/recommendations", post(recommendations))
        .route("/ai/travel-ideas", post(travel_ideas))
        .route("/ai/chat", post(chat))
        .route("/ai/reviews/:id/summary", post(summarize_review))
        .route("/ai/reviews/:id/similar-places", post(similar_places))
        .route("/ai/travel-tips", post(travel_tips))
        .route("/ai/test", get(probe))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub query: String,
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct TipsRequest {
    #[serde(default)]
    pub destination: String,
}

fn required<'a>(value: &'a str, message: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(value)
}

/// Catalog places picked by the model for a free-text query
async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(request): JsonBody<RecommendationRequest>,
) -> AppResult<Json<Value>> {
    let query = required(&request.query, "Please enter a travel query")?;
    let count = request.count.unwrap_or(DEFAULT_RECOMMENDATION_COUNT);
    if !(1..=MAX_RECOMMENDATION_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "Count must be between 1 and {}",
            MAX_RECOMMENDATION_COUNT
        )));
    }

    tracing::info!(%request_id, query = %query, count, "AI recommendation request");

    let places = state.recommender.recommend(query, count).await?;
    Ok(Json(json!({ "success": true, "recommendations": places })))
}

async fn travel_ideas(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<QueryRequest>,
) -> AppResult<Json<Value>> {
    let query = required(&request.query, "Please enter a travel query")?;
    let ideas = state.assistant.travel_ideas(query).await?;
    Ok(Json(json!({ "success": true, "ideas": ideas })))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> AppResult<Json<Value>> {
    let message = required(&request.message, "Please enter a message")?;
    let response = state.assistant.chat(message).await?;
    Ok(Json(json!({ "success": true, "response": response })))
}

async fn summarize_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let place = state.reviews.get(id).await?;
    let summary = state.assistant.summarize_review(&place.description).await?;
    Ok(Json(json!({
        "success": true,
        "summary": summary,
        "place_name": place.place_name,
    })))
}

async fn similar_places(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let place = state.reviews.get(id).await?;
    let suggestions = state
        .assistant
        .similar_places(&place.place_name, &place.location, &place.description)
        .await?;
    Ok(Json(json!({
        "success": true,
        "suggestions": suggestions,
        "place_name": place.place_name,
    })))
}

async fn travel_tips(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<TipsRequest>,
) -> AppResult<Json<Value>> {
    let destination = required(&request.destination, "Please enter a destination")?;
    let tips = state.assistant.travel_tips(destination).await?;
    Ok(Json(json!({
        "success": true,
        "tips": tips,
        "destination": destination,
    })))
}

/// Plain-text gateway liveness check
async fn probe(State(state): State<Arc<AppState>>) -> (StatusCode, String) {
    match state.assistant.probe().await {
        Ok(answer) => (StatusCode::OK, format!("AI gateway test: {}", answer)),
        Err(e) => (StatusCode::BAD_GATEWAY, format!("Test failed: {}", e)),
    }
}
