use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejections use the API error envelope
///
/// A missing content type, malformed JSON or a field of the wrong type all
/// become `AppError::Validation`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(invalid_body)?;
        Ok(JsonBody(value))
    }
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    tracing::debug!(status = %rejection.status(), "Rejected request body");
    AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}
