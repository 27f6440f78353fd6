use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Kind of place a review is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlaceType {
    Hotel,
    Restaurant,
    VisitingPlace,
}

impl PlaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Hotel => "Hotel",
            PlaceType::Restaurant => "Restaurant",
            PlaceType::VisitingPlace => "VisitingPlace",
        }
    }
}

impl Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlaceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "hotel" => Ok(PlaceType::Hotel),
            "restaurant" => Ok(PlaceType::Restaurant),
            "visitingplace" => Ok(PlaceType::VisitingPlace),
            _ => Err(AppError::Validation(format!("Unknown place type: {}", s))),
        }
    }
}

/// A stored review of a place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub place_name: String,
    pub place_type: PlaceType,
    pub rating: i32,
    pub location: String,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Email of the submitting account
    pub author: String,
}

impl Place {
    /// Public paths of every media file attached to this place
    pub fn media_paths(&self) -> Vec<&str> {
        self.image_path
            .iter()
            .chain(self.video_path.iter())
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// A place row as stored; `place_type` is kept as text in the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlaceRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub place_name: String,
    pub place_type: String,
    pub rating: i32,
    pub location: String,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: String,
}

impl TryFrom<PlaceRow> for Place {
    type Error = AppError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        let place_type = row.place_type.parse().map_err(|_| {
            AppError::Internal(format!(
                "Stored place {} has unknown type {}",
                row.id, row.place_type
            ))
        })?;

        Ok(Place {
            id: row.id,
            title: row.title,
            description: row.description,
            place_name: row.place_name,
            place_type,
            rating: row.rating,
            location: row.location,
            image_path: row.image_path,
            video_path: row.video_path,
            created_at: row.created_at,
            author: row.author,
        })
    }
}

/// Everything needed to insert a place; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub place_name: String,
    pub place_type: PlaceType,
    pub rating: i32,
    pub location: String,
    pub image_path: Option<String>,
    pub video_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: String,
}

impl NewPlace {
    /// The stored form of this place once the store has assigned `id`
    pub fn with_id(self, id: i64) -> Place {
        Place {
            id,
            title: self.title,
            description: self.description,
            place_name: self.place_name,
            place_type: self.place_type,
            rating: self.rating,
            location: self.location,
            image_path: self.image_path,
            video_path: self.video_path,
            created_at: self.created_at,
            author: self.author,
        }
    }
}

/// Submitted review fields before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceForm {
    pub title: String,
    pub description: String,
    pub place_name: String,
    pub place_type: String,
    pub rating: String,
    #[serde(default)]
    pub location: String,
}

impl PlaceForm {
    /// Validates the form into a `NewPlace` without media
    pub fn validate(self, author: &str, now: DateTime<Utc>) -> Result<NewPlace, AppError> {
        let title = required("Title", self.title)?;
        let description = required("Description", self.description)?;
        let place_name = required("Place name", self.place_name)?;
        let place_type: PlaceType = required("Place type", self.place_type)?.parse()?;

        let rating: i32 = self
            .rating
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Rating must be a whole number".to_string()))?;
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        Ok(NewPlace {
            title,
            description,
            place_name,
            place_type,
            rating,
            location: self.location.trim().to_string(),
            image_path: None,
            video_path: None,
            created_at: now,
            author: author.to_string(),
        })
    }
}

fn required(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Catalog search filters
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub place_type: Option<String>,
    #[serde(default)]
    pub min_rating: Option<i32>,
}

/// Search filters after normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    pub text: Option<String>,
    pub place_type: Option<PlaceType>,
    pub min_rating: Option<i32>,
}

impl TryFrom<SearchQuery> for PlaceFilter {
    type Error = AppError;

    fn try_from(query: SearchQuery) -> Result<Self, Self::Error> {
        let text = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let place_type = match query.place_type.as_deref().map(str::trim) {
            None | Some("") | Some("All Types") => None,
            Some(other) => Some(other.parse()?),
        };

        let min_rating = query.min_rating.filter(|r| *r > 0);

        Ok(PlaceFilter {
            text,
            place_type,
            min_rating,
        })
    }
}
