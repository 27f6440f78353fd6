use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::RequestContext;

/// Redis key under which one session is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(pub String);

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Creates a Redis client for session storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Server-side session storage keyed by an opaque token
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the context under a new token and returns the token
    async fn create(&self, context: &RequestContext) -> AppResult<String>;

    /// Looks up a live session and extends its idle timeout
    async fn get(&self, token: &str) -> AppResult<Option<RequestContext>>;

    async fn remove(&self, token: &str) -> AppResult<()>;
}

/// Sessions stored as JSON with an idle-timeout TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSessionStore {
    /// Connects through a connection manager, which reconnects on failure
    pub async fn new(client: Client, ttl_secs: u64) -> anyhow::Result<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, ttl_secs })
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, context: &RequestContext) -> AppResult<String> {
        let token = Uuid::new_v4().to_string();
        let json = serde_json::to_string(context)
            .map_err(|e| AppError::Internal(format!("Session serialization error: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(SessionKey(token.clone()).to_string(), json, self.ttl_secs)
            .await?;

        tracing::debug!(account_id = context.account_id, "Session created");
        Ok(token)
    }

    async fn get(&self, token: &str) -> AppResult<Option<RequestContext>> {
        let key = SessionKey(token.to_string()).to_string();
        let mut conn = self.conn.clone();
        let stored: Option<String> = conn.get(&key).await?;

        match stored {
            Some(json) => {
                let context = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Session deserialization error: {}", e))
                })?;
                let _: () = conn.expire(&key, self.ttl_secs as i64).await?;
                Ok(Some(context))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, token: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(SessionKey(token.to_string()).to_string()).await?;
        Ok(())
    }
}
