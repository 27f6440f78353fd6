use chrono::Utc;
use std::sync::Arc;

use crate::{
    db::PlaceStore,
    error::{AppError, AppResult},
    models::{Place, PlaceFilter, PlaceForm, RequestContext, SearchQuery},
    services::media::{MediaStorage, UploadedFile},
};

pub const FEATURED_COUNT: i64 = 6;

/// Review submission, lookup and removal
#[derive(Clone)]
pub struct ReviewService {
    places: Arc<dyn PlaceStore>,
    media: MediaStorage,
}

impl ReviewService {
    pub fn new(places: Arc<dyn PlaceStore>, media: MediaStorage) -> Self {
        Self { places, media }
    }

    pub async fn get(&self, id: i64) -> AppResult<Place> {
        self.places
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    /// Best-rated places for the home page
    pub async fn featured(&self) -> AppResult<Vec<Place>> {
        self.places.top_rated(FEATURED_COUNT).await
    }

    pub async fn search(&self, query: SearchQuery) -> AppResult<Vec<Place>> {
        let filter = PlaceFilter::try_from(query)?;
        tracing::debug!(filter = ?filter, "Searching reviews");
        self.places.search(&filter).await
    }

    /// Administrators see every review, everyone else their own
    pub async fn dashboard(&self, context: &RequestContext) -> AppResult<Vec<Place>> {
        if context.is_admin {
            self.places.find_all().await
        } else {
            self.places.find_by_author(&context.email).await
        }
    }

    /// Validates and stores a review authored by the caller
    ///
    /// Files already written are removed again if a later step fails.
    pub async fn create(
        &self,
        context: &RequestContext,
        form: PlaceForm,
        image: Option<UploadedFile>,
        video: Option<UploadedFile>,
    ) -> AppResult<Place> {
        let mut new_place = form.validate(&context.email, Utc::now())?;

        if let Some(image) = &image {
            new_place.image_path = self.media.save_image(image).await?;
        }

        if let Some(video) = &video {
            match self.media.save_video(video).await {
                Ok(path) => new_place.video_path = path,
                Err(e) => {
                    self.discard(new_place.image_path.as_deref()).await;
                    return Err(e);
                }
            }
        }

        let image_path = new_place.image_path.clone();
        let video_path = new_place.video_path.clone();

        match self.places.insert(new_place).await {
            Ok(place) => {
                tracing::info!(
                    place_id = place.id,
                    author = %place.author,
                    "Review created"
                );
                Ok(place)
            }
            Err(e) => {
                self.discard(image_path.as_deref()).await;
                self.discard(video_path.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Deletes a review and its media; only the author or an admin may
    pub async fn delete(&self, context: &RequestContext, id: i64) -> AppResult<()> {
        let place = self.get(id).await?;

        if !context.can_manage(&place.author) {
            tracing::warn!(
                place_id = id,
                email = %context.email,
                "Review deletion forbidden"
            );
            return Err(AppError::Forbidden(
                "You can only delete your own reviews".to_string(),
            ));
        }

        for path in place.media_paths() {
            self.media.remove(path).await?;
        }

        if !self.places.delete(id).await? {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }

        tracing::info!(place_id = id, email = %context.email, "Review deleted");
        Ok(())
    }

    async fn discard(&self, path: Option<&str>) {
        let Some(path) = path else { return };
        if let Err(e) = self.media.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to clean up media file");
        }
    }
}
