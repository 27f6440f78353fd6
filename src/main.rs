use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use travelshare_api::{
    config::Config,
    create_router,
    db::{
        create_pool, create_redis_client, run_migrations, seed::seed_initial_data, PgAccountStore,
        PgPlaceStore, RedisSessionStore,
    },
    services::{GroqClient, MediaStorage},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("travelshare_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let places = Arc::new(PgPlaceStore::new(pool.clone()));
    let accounts = Arc::new(PgAccountStore::new(pool));
    seed_initial_data(
        accounts.as_ref(),
        places.as_ref(),
        &config.admin_email,
        &config.admin_password,
    )
    .await?;

    let redis = create_redis_client(&config.redis_url)?;
    let sessions = Arc::new(RedisSessionStore::new(redis, config.session_ttl_secs).await?);

    let gateway = Arc::new(GroqClient::from_config(&config)?);

    let state = Arc::new(AppState::new(
        places,
        accounts,
        sessions,
        gateway,
        MediaStorage::new(config.web_root.clone()),
        &config.admin_email,
        config.session_ttl_secs,
    ));

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "TravelShare API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
