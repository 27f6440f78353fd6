pub mod accounts;
pub mod places;
pub mod postgres;
pub mod redis;
pub mod seed;

pub use accounts::{AccountStore, PgAccountStore};
pub use places::{PgPlaceStore, PlaceStore};
pub use postgres::{create_pool, run_migrations};
pub use self::redis::{create_redis_client, RedisSessionStore, SessionStore};
