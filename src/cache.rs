// src/cache.rs
//! Key-value cache with per-entry expiry, fronting Redis in production.
//!
//! Everything the service shares goes through [`CacheStore`]; the trait keeps
//! the store substitutable so tests run against [`MemoryStore`]. Connectivity
//! failures surface as [`CacheError::Unavailable`], never as a missing key.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

/// Keyspace prefix for cached articles.
pub const ARTICLE_PREFIX: &str = "article:";

/// Cache key for an article id.
pub fn article_key(id: &str) -> String {
    format!("{ARTICLE_PREFIX}{id}")
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

impl CacheError {
    fn from_redis(op: &str, e: redis::RedisError) -> Self {
        CacheError::Unavailable(format!("{op}: {e}"))
    }
}

/// The four operations (plus batching) the core needs from any key-value
/// engine with expiry support.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any prior value, expiring at
    /// now + `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Repeated `put` in a single round trip. Partial application on
    /// connection loss is tolerated; entries are re-derived next cycle.
    async fn put_many(&self, entries: &[(String, String, Duration)]) -> Result<(), CacheError>;

    /// `None` means missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Batched `get`, preserving input order.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;

    /// Unordered enumeration of live keys under `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    /// Liveness probe.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Redis-backed store. Uses a `ConnectionManager` for automatic reconnection
/// and resilience; each operation clones the manager (cheap handle).
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("redis_url", &self.redis_url)
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        info!(url = redis_url, "connecting to redis");
        let client =
            redis::Client::open(redis_url).map_err(|e| CacheError::from_redis("redis open", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::from_redis("redis connect", e))?;
        Ok(Self {
            conn,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| CacheError::from_redis("redis SETEX", e))
    }

    async fn put_many(&self, entries: &[(String, String, Duration)]) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for (key, value, ttl) in entries {
            pipe.set_ex(key, value, ttl.as_secs()).ignore();
        }
        let mut conn = self.conn.clone();
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| CacheError::from_redis("redis pipeline SETEX", e))?;
        debug!(entries = entries.len(), "cache batch write");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::from_redis("redis GET", e))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        conn.mget::<_, Vec<Option<String>>>(keys)
            .await
            .map_err(|e| CacheError::from_redis("redis MGET", e))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut keys = Vec::new();
        let mut iter = conn
            .scan_match::<_, String>(&pattern)
            .await
            .map_err(|e| CacheError::from_redis("redis SCAN", e))?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| CacheError::from_redis("redis PING", e))
    }
}

/// In-process store with the same expiry semantics, used when no Redis URL
/// is configured and as the substitutable store in tests. `set_online(false)`
/// makes every operation fail with `Unavailable`, which is how tests exercise
/// store-outage paths.
#[derive(Debug)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    online: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), CacheError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("memory store offline".into()))
        }
    }

    fn live_value(entry: Option<&(String, Instant)>, now: Instant) -> Option<String> {
        match entry {
            Some((value, expires_at)) if *expires_at > now => Some(value.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check_online()?;
        let expires_at = Instant::now() + ttl;
        let mut map = self.entries.write().expect("cache lock poisoned");
        map.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn put_many(&self, entries: &[(String, String, Duration)]) -> Result<(), CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let mut map = self.entries.write().expect("cache lock poisoned");
        for (key, value, ttl) in entries {
            map.insert(key.clone(), (value.clone(), now + *ttl));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let map = self.entries.read().expect("cache lock poisoned");
        Ok(Self::live_value(map.get(key), now))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let map = self.entries.read().expect("cache lock poisoned");
        Ok(keys
            .iter()
            .map(|key| Self::live_value(map.get(key), now))
            .collect())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        self.check_online()?;
        let now = Instant::now();
        let map = self.entries.read().expect("cache lock poisoned");
        Ok(map
            .iter()
            .filter(|(key, (_, expires_at))| key.starts_with(prefix) && *expires_at > now)
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.check_online()
    }
}
