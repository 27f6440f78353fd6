use chrono::{Duration, Utc};

use crate::{
    db::{AccountStore, PlaceStore},
    error::AppResult,
    models::{NewAccount, NewPlace, PlaceType},
};

/// Inserts the administrator account and sample places on first start
///
/// Idempotent: the admin is only created when missing, and samples are only
/// added to an empty catalog.
pub async fn seed_initial_data(
    accounts: &dyn AccountStore,
    places: &dyn PlaceStore,
    admin_email: &str,
    admin_password: &str,
) -> AppResult<()> {
    if accounts.find_by_email(admin_email).await?.is_none() {
        accounts
            .insert(NewAccount {
                email: admin_email.to_string(),
                password: admin_password.to_string(),
                full_name: "Admin User".to_string(),
                is_admin: true,
            })
            .await?;
        tracing::info!(email = %admin_email, "Seeded administrator account");
    }

    if !places.find_all().await?.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    let samples = [
        NewPlace {
            title: "Amazing Beach Resort".to_string(),
            description: "Beautiful location with excellent service and amenities.".to_string(),
            place_name: "Sunset Beach Resort".to_string(),
            place_type: PlaceType::Hotel,
            rating: 5,
            location: "Miami, Florida".to_string(),
            image_path: None,
            video_path: None,
            created_at: now - Duration::days(5),
            author: admin_email.to_string(),
        },
        NewPlace {
            title: "Best Italian Food".to_string(),
            description: "Authentic Italian cuisine with great atmosphere.".to_string(),
            place_name: "Mario's Trattoria".to_string(),
            place_type: PlaceType::Restaurant,
            rating: 4,
            location: "New York, NY".to_string(),
            image_path: None,
            video_path: None,
            created_at: now - Duration::days(3),
            author: admin_email.to_string(),
        },
    ];

    for sample in samples {
        places.insert(sample).await?;
    }
    tracing::info!("Seeded sample places");

    Ok(())
}
