use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{NewPlace, Place, PlaceFilter, PlaceRow},
};

const PLACE_COLUMNS: &str = "id, title, description, place_name, place_type, rating, location, \
                             image_path, video_path, created_at, author";

/// Query surface of the place catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaceStore: Send + Sync {
    /// Every place, newest first
    async fn find_all(&self) -> AppResult<Vec<Place>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Place>>;

    /// Places written by `author`, newest first
    async fn find_by_author(&self, author: &str) -> AppResult<Vec<Place>>;

    /// Places matching the filter, newest first
    async fn search(&self, filter: &PlaceFilter) -> AppResult<Vec<Place>>;

    /// Highest rated places, ties broken by recency
    async fn top_rated(&self, limit: i64) -> AppResult<Vec<Place>>;

    async fn insert(&self, place: NewPlace) -> AppResult<Place>;

    /// Removes the row; returns false when no row had that id
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// PostgreSQL-backed place catalog
#[derive(Clone)]
pub struct PgPlaceStore {
    pool: PgPool,
}

impl PgPlaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_places(rows: Vec<PlaceRow>) -> AppResult<Vec<Place>> {
    rows.into_iter().map(Place::try_from).collect()
}

/// Wraps user text in `%` for ILIKE, escaping the pattern metacharacters
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait::async_trait]
impl PlaceStore for PgPlaceStore {
    async fn find_all(&self) -> AppResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        into_places(rows)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Place::try_from).transpose()
    }

    async fn find_by_author(&self, author: &str) -> AppResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE author = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        into_places(rows)
    }

    async fn search(&self, filter: &PlaceFilter) -> AppResult<Vec<Place>> {
        let pattern = filter.text.as_deref().map(like_pattern);
        let place_type = filter.place_type.map(|t| t.as_str().to_string());

        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            r#"
            SELECT {PLACE_COLUMNS} FROM places
            WHERE ($1::text IS NULL
                   OR place_name ILIKE $1
                   OR location ILIKE $1
                   OR description ILIKE $1
                   OR title ILIKE $1)
              AND ($2::text IS NULL OR place_type = $2)
              AND ($3::int IS NULL OR rating >= $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(pattern)
        .bind(place_type)
        .bind(filter.min_rating)
        .fetch_all(&self.pool)
        .await?;

        into_places(rows)
    }

    async fn top_rated(&self, limit: i64) -> AppResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(&format!(
            "SELECT {PLACE_COLUMNS} FROM places \
             ORDER BY rating DESC, created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_places(rows)
    }

    async fn insert(&self, place: NewPlace) -> AppResult<Place> {
        let row = sqlx::query_as::<_, PlaceRow>(&format!(
            r#"
            INSERT INTO places
                (title, description, place_name, place_type, rating, location,
                 image_path, video_path, created_at, author)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(&place.title)
        .bind(&place.description)
        .bind(&place.place_name)
        .bind(place.place_type.as_str())
        .bind(place.rating)
        .bind(&place.location)
        .bind(&place.image_path)
        .bind(&place.video_path)
        .bind(place.created_at)
        .bind(&place.author)
        .fetch_one(&self.pool)
        .await?;

        Place::try_from(row)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
