#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::HeaderValue;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use travelshare_api::{
    create_router,
    db::{seed::seed_initial_data, AccountStore, PlaceStore, SessionStore},
    error::{AppError, AppResult},
    models::{Account, NewAccount, NewPlace, Place, PlaceFilter, RequestContext},
    services::{
        gateway::{CompletionClient, CompletionRequest, GatewayError},
        MediaStorage,
    },
    AppState,
};

pub const ADMIN_EMAIL: &str = "admin@travel.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Same predicate as the SQL search: case-insensitive text over the four
/// text fields, exact type, minimum rating
fn filter_matches(filter: &PlaceFilter, place: &Place) -> bool {
    let text_hit = filter.text.as_ref().map_or(true, |text| {
        let needle = text.to_lowercase();
        [&place.place_name, &place.location, &place.description, &place.title]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    });

    text_hit
        && filter.place_type.map_or(true, |t| place.place_type == t)
        && filter.min_rating.map_or(true, |r| place.rating >= r)
}

fn newest_first(places: &mut [Place]) {
    places.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[derive(Default)]
pub struct MemoryPlaceStore {
    places: Mutex<Vec<Place>>,
}

#[async_trait::async_trait]
impl PlaceStore for MemoryPlaceStore {
    async fn find_all(&self) -> AppResult<Vec<Place>> {
        let mut places = self.places.lock().unwrap().clone();
        newest_first(&mut places);
        Ok(places)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Place>> {
        Ok(self.places.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_author(&self, author: &str) -> AppResult<Vec<Place>> {
        let mut places: Vec<Place> = self.find_all().await?;
        places.retain(|p| p.author == author);
        Ok(places)
    }

    async fn search(&self, filter: &PlaceFilter) -> AppResult<Vec<Place>> {
        let mut places: Vec<Place> = self.find_all().await?;
        places.retain(|p| filter_matches(filter, p));
        Ok(places)
    }

    async fn top_rated(&self, limit: i64) -> AppResult<Vec<Place>> {
        let mut places = self.find_all().await?;
        places.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then(b.created_at.cmp(&a.created_at))
        });
        places.truncate(limit as usize);
        Ok(places)
    }

    async fn insert(&self, place: NewPlace) -> AppResult<Place> {
        let mut places = self.places.lock().unwrap();
        let id = places.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let place = place.with_id(id);
        places.push(place.clone());
        Ok(place)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut places = self.places.lock().unwrap();
        let before = places.len();
        places.retain(|p| p.id != id);
        Ok(places.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AppError::Validation("Email already exists".to_string()));
        }
        let account = Account {
            id: accounts.len() as i64 + 1,
            email: account.email,
            password: account.password,
            full_name: account.full_name,
            is_admin: account.is_admin,
        };
        accounts.push(account.clone());
        Ok(account)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, RequestContext>>,
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, context: &RequestContext) -> AppResult<String> {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), context.clone());
        Ok(token)
    }

    async fn get(&self, token: &str) -> AppResult<Option<RequestContext>> {
        Ok(self.sessions.lock().unwrap().get(token).cloned())
    }

    async fn remove(&self, token: &str) -> AppResult<()> {
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }
}

/// Gateway stand-in that always gives the same answer and records prompts
pub struct ScriptedGateway {
    reply: Result<String, GatewayError>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CompletionClient for ScriptedGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request);
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub places: Arc<MemoryPlaceStore>,
    pub gateway: Arc<ScriptedGateway>,
    pub web_root: TempDir,
}

impl TestApp {
    /// Seeded app: the administrator plus the two sample places
    pub async fn new(gateway: ScriptedGateway) -> Self {
        let places = Arc::new(MemoryPlaceStore::default());
        let accounts = Arc::new(MemoryAccountStore::default());
        let gateway = Arc::new(gateway);
        let web_root = tempfile::tempdir().unwrap();

        seed_initial_data(accounts.as_ref(), places.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        let state = Arc::new(AppState::new(
            places.clone(),
            accounts,
            Arc::new(MemorySessionStore::default()),
            gateway.clone(),
            MediaStorage::new(web_root.path()),
            ADMIN_EMAIL,
            1800,
        ));

        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            places,
            gateway,
            web_root,
        }
    }

    /// Registers an account and returns its session cookie
    pub async fn register(&self, email: &str) -> HeaderValue {
        let response = self
            .server
            .post("/api/accounts/register")
            .json(&json!({
                "email": email,
                "password": "secret",
                "full_name": "Test User"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        session_cookie(&response.json::<serde_json::Value>())
    }

    pub async fn login(&self, email: &str, password: &str) -> HeaderValue {
        let response = self
            .server
            .post("/api/accounts/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        session_cookie(&response.json::<serde_json::Value>())
    }
}

pub fn session_cookie(body: &serde_json::Value) -> HeaderValue {
    let token = body["token"].as_str().unwrap();
    HeaderValue::from_str(&format!("travelshare_session={}", token)).unwrap()
}

