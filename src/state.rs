use std::sync::Arc;

use crate::{
    db::{AccountStore, PlaceStore, SessionStore},
    services::{AccountService, Assistant, CompletionClient, MediaStorage, Recommender, ReviewService},
};

/// Shared application state handed to every handler
pub struct AppState {
    pub accounts: AccountService,
    pub reviews: ReviewService,
    pub recommender: Recommender,
    pub assistant: Assistant,
    pub sessions: Arc<dyn SessionStore>,
    pub media: MediaStorage,
    pub session_ttl_secs: u64,
}

impl AppState {
    /// Wires services over the given stores and gateway
    pub fn new(
        places: Arc<dyn PlaceStore>,
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        gateway: Arc<dyn CompletionClient>,
        media: MediaStorage,
        admin_email: &str,
        session_ttl_secs: u64,
    ) -> Self {
        Self {
            accounts: AccountService::new(accounts, admin_email),
            reviews: ReviewService::new(places.clone(), media.clone()),
            recommender: Recommender::new(places, gateway.clone()),
            assistant: Assistant::new(gateway),
            sessions,
            media,
            session_ttl_secs,
        }
    }
}
