pub mod sessions;

pub use sessions::{create_redis_client, RedisSessionStore, SessionKey, SessionStore};
