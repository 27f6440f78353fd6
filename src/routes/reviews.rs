use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Place, PlaceForm, RequestContext, SearchQuery},
    services::{media::MAX_VIDEO_BYTES, UploadedFile},
    state::AppState,
};

/// Room for a maximum-size video plus an image and the text fields
const MAX_SUBMISSION_BYTES: usize = MAX_VIDEO_BYTES + 16 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/reviews",
            post(create).layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES)),
        )
        .route("/reviews/featured", get(featured))
        .route("/reviews/search", get(search))
        .route("/reviews/dashboard", get(dashboard))
        .route("/reviews/:id", get(show).delete(remove))
        .route("/reviews/:id/similar", get(similar))
}

async fn featured(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(state.reviews.featured().await?))
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(state.reviews.search(query).await?))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(state.reviews.dashboard(&context).await?))
}

async fn show(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> AppResult<Json<Place>> {
    Ok(Json(state.reviews.get(id).await?))
}

async fn similar(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Place>>> {
    Ok(Json(state.recommender.similar_to(id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Place>)> {
    let submission = read_submission(multipart).await?;
    let place = state
        .reviews
        .create(&context, submission.form, submission.image, submission.video)
        .await?;
    Ok((StatusCode::CREATED, Json(place)))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    state.reviews.delete(&context, id).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Default)]
struct Submission {
    form: PlaceForm,
    image: Option<UploadedFile>,
    video: Option<UploadedFile>,
}

async fn read_submission(mut multipart: Multipart) -> AppResult<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" | "video" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(malformed)?;
                let file = Some(UploadedFile { file_name, data });
                if name == "image" {
                    submission.image = file;
                } else {
                    submission.video = file;
                }
            }
            _ => {
                let value = field.text().await.map_err(malformed)?;
                let form = &mut submission.form;
                match name.as_str() {
                    "title" => form.title = value,
                    "description" => form.description = value,
                    "place_name" => form.place_name = value,
                    "place_type" => form.place_type = value,
                    "rating" => form.rating = value,
                    "location" => form.location = value,
                    other => tracing::debug!(field = %other, "Ignoring unknown form field"),
                }
            }
        }
    }

    Ok(submission)
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed upload: {}", e))
}
