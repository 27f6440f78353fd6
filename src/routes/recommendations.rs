use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Place, RequestContext},
    services::recommendations::DEFAULT_RECOMMENDATION_COUNT,
    state::AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommendations", get(for_current_account))
}

/// Affinity recommendations for the signed-in account
async fn for_current_account(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> AppResult<Json<Vec<Place>>> {
    let places = state
        .recommender
        .for_account(&context.email, DEFAULT_RECOMMENDATION_COUNT)
        .await?;
    Ok(Json(places))
}
