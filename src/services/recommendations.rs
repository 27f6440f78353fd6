use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    db::PlaceStore,
    error::{AppError, AppResult},
    models::{Place, PlaceType},
    services::{
        gateway::{CompletionClient, CompletionRequest},
        suggestion_filter::{filter_suggestions, PlaceNameIndex},
    },
};

pub const DEFAULT_RECOMMENDATION_COUNT: usize = 6;
/// Largest count a caller may ask the model for
pub const MAX_RECOMMENDATION_COUNT: usize = 20;
const SIMILAR_PLACES_LIMIT: usize = 4;
const PREFERRED_TYPE_COUNT: usize = 2;
const SUGGESTION_TEMPERATURE: f32 = 0.3;
const SUGGESTION_MAX_TOKENS: u32 = 150;

/// Recommends places from the catalog
///
/// Three strategies are offered:
/// 1. `recommend`: the model picks from the catalog's own place names and the
///    answer is whitelisted against the catalog. Never pads or substitutes.
/// 2. `for_account`: rating and place-type affinity, no model involved.
/// 3. `similar_to`: places sharing a type or a city with a given place.
#[derive(Clone)]
pub struct Recommender {
    places: Arc<dyn PlaceStore>,
    gateway: Arc<dyn CompletionClient>,
}

impl Recommender {
    pub fn new(places: Arc<dyn PlaceStore>, gateway: Arc<dyn CompletionClient>) -> Self {
        Self { places, gateway }
    }

    /// Places matching a free-text preference, in the order the model gave
    ///
    /// The model is never asked for more names than the catalog holds.
    /// Gateway failures are logged and produce an empty list; store failures
    /// are returned.
    pub async fn recommend(&self, preference: &str, desired_count: usize) -> AppResult<Vec<Place>> {
        if desired_count == 0 {
            return Ok(Vec::new());
        }

        let catalog = self.places.find_all().await?;
        let index = PlaceNameIndex::new(catalog.iter().map(|p| p.place_name.clone()));
        if index.is_empty() {
            tracing::info!("Catalog is empty, nothing to recommend");
            return Ok(Vec::new());
        }

        let desired_count = desired_count.min(index.len());
        let prompt = suggestion_prompt(&index.names(), preference, desired_count);
        let request = CompletionRequest::new(prompt)
            .with_temperature(SUGGESTION_TEMPERATURE)
            .with_max_tokens(SUGGESTION_MAX_TOKENS);

        let raw = match self.gateway.complete(request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    provider = self.gateway.name(),
                    "AI suggestion failed, returning no recommendations"
                );
                return Ok(Vec::new());
            }
        };

        let names = filter_suggestions(&raw, &index);
        let resolved = resolve_places(&names, &catalog, desired_count);

        if resolved.is_empty() {
            tracing::info!("No AI suggestion matched the catalog");
        } else if resolved.len() < desired_count {
            tracing::info!(
                found = resolved.len(),
                requested = desired_count,
                "Fewer AI recommendations than requested"
            );
        }

        Ok(resolved)
    }

    /// Dashboard recommendations for `email` without the model
    ///
    /// Newcomers get the global top-rated places. Everyone else gets other
    /// authors' places of the two place types they review most.
    pub async fn for_account(&self, email: &str, desired_count: usize) -> AppResult<Vec<Place>> {
        let own = self.places.find_by_author(email).await?;
        let catalog = self.places.find_all().await?;

        let mut candidates: Vec<Place> = if own.is_empty() {
            catalog
        } else {
            let preferred = preferred_types(&own);
            tracing::debug!(email = %email, preferred = ?preferred, "Affinity place types");

            catalog
                .into_iter()
                .filter(|p| p.author != email && preferred.contains(&p.place_type))
                .collect()
        };

        rank_by_rating(&mut candidates);
        candidates.truncate(desired_count);
        Ok(candidates)
    }

    /// Up to four places sharing the type or the leading location segment
    pub async fn similar_to(&self, place_id: i64) -> AppResult<Vec<Place>> {
        let source = self
            .places
            .find_by_id(place_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", place_id)))?;

        let city = leading_location_segment(&source.location);

        let mut similar: Vec<Place> = self
            .places
            .find_all()
            .await?
            .into_iter()
            .filter(|p| p.id != source.id)
            .filter(|p| {
                p.place_type == source.place_type
                    || city
                        .as_ref()
                        .is_some_and(|c| p.location.to_lowercase().contains(c.as_str()))
            })
            .collect();

        rank_by_rating(&mut similar);
        similar.truncate(SIMILAR_PLACES_LIMIT);
        Ok(similar)
    }
}

fn suggestion_prompt(names: &[&str], preference: &str, count: usize) -> String {
    let example = (1..=count)
        .map(|i| format!("Place{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"I have a travel website with ONLY these exact places available:
{names}

User is looking for: "{preference}"

CRITICAL INSTRUCTIONS:
1. You MUST ONLY suggest places from the exact list above
2. Do NOT invent, create, or suggest any new places
3. Do NOT include any explanations or additional text
4. Return exactly {count} place names as a comma-separated list
5. If you can't find perfect matches, choose the closest ones from the list

Required format: "{example}"

SUGGESTED PLACES:"#,
        names = names.join(", "),
        preference = preference.trim(),
    )
}

/// Maps validated names to the first catalog place of that name
fn resolve_places(names: &[String], catalog: &[Place], limit: usize) -> Vec<Place> {
    let mut resolved: Vec<Place> = Vec::new();

    for name in names {
        let Some(place) = catalog
            .iter()
            .find(|p| p.place_name.to_lowercase() == name.to_lowercase())
        else {
            continue;
        };

        if !resolved.iter().any(|r| r.id == place.id) {
            resolved.push(place.clone());
        }
        if resolved.len() == limit {
            break;
        }
    }

    resolved
}

/// The most frequent place types, ties broken by type order
fn preferred_types(places: &[Place]) -> Vec<PlaceType> {
    let mut counts: HashMap<PlaceType, usize> = HashMap::new();
    for place in places {
        *counts.entry(place.place_type).or_default() += 1;
    }

    let mut ranked: Vec<(PlaceType, usize)> = counts.into_iter().collect();
    ranked.sort_by_key(|(place_type, count)| (Reverse(*count), *place_type));
    ranked
        .into_iter()
        .take(PREFERRED_TYPE_COUNT)
        .map(|(place_type, _)| place_type)
        .collect()
}

/// Rating descending, then newest first
fn rank_by_rating(places: &mut [Place]) {
    places.sort_by(|a, b| {
        b.rating
            .cmp(&a.rating)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

/// Lower-cased text before the first comma, if any
fn leading_location_segment(location: &str) -> Option<String> {
    let segment = location.split(',').next().unwrap_or_default().trim();
    (!segment.is_empty()).then(|| segment.to_lowercase())
}
