//! # Redis
//!
//! Document store for the thought collection.
//!
//! Core purpose is to persist thoughts, list the newest ones and increment hearts atomically.
//!
//! ## Requirements
//!
//! - Newest-first listing capped at a small fixed limit
//! - Lost-update free like counter under concurrent requests
//! - One long-lived connection shared by every request
//!
//! ## Implementation
//!
//! - Redis hash per thought: `thought:{id}` holding `message`, `hearts`, `createdAt` (epoch ms)
//! - Redis sorted set `thoughts:created`: id scored by an insertion sequence from `INCR thoughts:seq`
//! - Create: Lua script, clamps `createdAt` to the newest stored one, so sequence order and
//!   `createdAt` order agree even when two creates share a millisecond or clocks drift
//! - List: Lua script, `ZREVRANGE` then `HMGET` per id, one round trip
//! - Like: Lua script, existence check + `HINCRBY` + read back, atomic since Redis runs scripts serially
//! - `ConnectionManager` reconnects on its own and is cheap to clone per request
//! - Every key may carry a namespace prefix, empty in production
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    store::{StoreError, ThoughtStore},
    thought::{Thought, now_millis},
};

pub const THOUGHT_PREFIX: &str = "thought:";
pub const CREATED_INDEX: &str = "thoughts:created";
pub const SEQUENCE: &str = "thoughts:seq";
pub const LATEST_CREATED_AT: &str = "thoughts:latest";

/// KEYS[1] = thought key
/// KEYS[2] = created index
/// KEYS[3] = sequence key
/// KEYS[4] = latest createdAt key
///
/// ARGV[1] = thought id
/// ARGV[2] = message
/// ARGV[3] = now (epoch ms)
///
/// Returns: the stored createdAt
const CREATE_SCRIPT: &str = r#"
local created_at = tonumber(ARGV[3])
local latest = tonumber(redis.call('GET', KEYS[4]))
if latest and latest > created_at then
    created_at = latest
end

local seq = redis.call('INCR', KEYS[3])
redis.call('HSET', KEYS[1], 'message', ARGV[2], 'hearts', 0, 'createdAt', created_at)
redis.call('ZADD', KEYS[2], seq, ARGV[1])
redis.call('SET', KEYS[4], created_at)

return created_at
"#;

/// KEYS[1] = created index
///
/// ARGV[1] = limit, at least 1
/// ARGV[2] = thought key prefix
///
/// Returns: array of {id, message, hearts, createdAt}, newest first
const RECENT_SCRIPT: &str = r#"
local ids = redis.call('ZREVRANGE', KEYS[1], 0, tonumber(ARGV[1]) - 1)
local thoughts = {}

for _, id in ipairs(ids) do
    local fields = redis.call('HMGET', ARGV[2] .. id, 'message', 'hearts', 'createdAt')
    if fields[1] then
        table.insert(thoughts, {id, fields[1], fields[2], fields[3]})
    end
end

return thoughts
"#;

/// KEYS[1] = thought key
///
/// Returns: {message, hearts, createdAt} after the increment, nil if missing
const LIKE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return false
end

local hearts = redis.call('HINCRBY', KEYS[1], 'hearts', 1)
local fields = redis.call('HMGET', KEYS[1], 'message', 'createdAt')

return {fields[1], hearts, fields[2]}
"#;

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let mut connection_manager = client.get_connection_manager_with_config(config).await?;

    let _: String = redis::cmd("PING")
        .query_async(&mut connection_manager)
        .await?;
    info!("Redis connection established");

    Ok(connection_manager)
}

pub struct RedisStore {
    connection: ConnectionManager,
    namespace: String,
    create_script: Script,
    recent_script: Script,
    like_script: Script,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self::with_namespace(connection, "")
    }

    /// Prefixes every key with `namespace`.
    pub fn with_namespace(connection: ConnectionManager, namespace: &str) -> Self {
        Self {
            connection,
            namespace: namespace.to_string(),
            create_script: Script::new(CREATE_SCRIPT),
            recent_script: Script::new(RECENT_SCRIPT),
            like_script: Script::new(LIKE_SCRIPT),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.namespace)
    }

    fn thought_key(&self, id: &str) -> String {
        format!("{}{THOUGHT_PREFIX}{id}", self.namespace)
    }
}

#[async_trait]
impl ThoughtStore for RedisStore {
    async fn create(&self, message: String) -> Result<Thought, StoreError> {
        let id = Uuid::new_v4().to_string();

        let mut connection = self.connection.clone();
        let created_at_ms: i64 = self
            .create_script
            .key(self.thought_key(&id))
            .key(self.key(CREATED_INDEX))
            .key(self.key(SEQUENCE))
            .key(self.key(LATEST_CREATED_AT))
            .arg(&id)
            .arg(&message)
            .arg(now_millis().timestamp_millis())
            .invoke_async(&mut connection)
            .await?;

        Thought::from_parts(id, message, 0, created_at_ms)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError> {
        // ZREVRANGE 0 -1 would return everything
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.clone();
        let rows: Vec<(String, String, i64, i64)> = self
            .recent_script
            .key(self.key(CREATED_INDEX))
            .arg(limit)
            .arg(self.key(THOUGHT_PREFIX))
            .invoke_async(&mut connection)
            .await?;

        rows.into_iter()
            .map(|(id, message, hearts, created_at_ms)| {
                Thought::from_parts(id, message, hearts, created_at_ms)
            })
            .collect()
    }

    async fn like(&self, id: &str) -> Result<Option<Thought>, StoreError> {
        let mut connection = self.connection.clone();
        let row: Option<(String, i64, i64)> = self
            .like_script
            .key(self.thought_key(id))
            .invoke_async(&mut connection)
            .await?;

        row.map(|(message, hearts, created_at_ms)| {
            Thought::from_parts(id.to_string(), message, hearts, created_at_ms)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    async fn store() -> RedisStore {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let namespace = format!("test:{}:", Uuid::new_v4());

        RedisStore::with_namespace(init_redis(&url).await.unwrap(), &namespace)
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_keys_are_namespaced() {
        let store = store().await;

        assert!(store.thought_key("abc").ends_with(":thought:abc"));
        assert!(store.key(CREATED_INDEX).starts_with("test:"));
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_create_then_like() {
        let store = store().await;

        let created = store.create("Hello world!".into()).await.unwrap();
        let liked = store.like(&created.id).await.unwrap().unwrap();

        assert_eq!(liked.id, created.id);
        assert_eq!(liked.hearts, 1);
        assert_eq!(liked.created_at, created.created_at);

        let recent = store.recent(20).await.unwrap();
        assert_eq!(recent, vec![liked]);
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_recent_keeps_exact_newest_order() {
        let store = store().await;

        let mut ids = Vec::new();
        for i in 0..25 {
            let created = store.create(format!("Quick thought {i}")).await.unwrap();
            ids.push(created.id);
        }

        let recent = store.recent(20).await.unwrap();

        let listed: Vec<_> = recent.iter().map(|t| t.id.as_str()).collect();
        let expected: Vec<_> = ids.iter().rev().take(20).map(String::as_str).collect();
        assert_eq!(listed, expected);
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_created_at_never_goes_backwards() {
        let store = store().await;

        // a clock on another instance running ahead
        let ahead = now_millis().timestamp_millis() + 60_000;
        let mut connection = store.connection.clone();
        redis::cmd("SET")
            .arg(store.key(LATEST_CREATED_AT))
            .arg(ahead)
            .query_async::<()>(&mut connection)
            .await
            .unwrap();

        let created = store.create("From the past".into()).await.unwrap();

        assert_eq!(created.created_at.timestamp_millis(), ahead);
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_recent_zero_limit() {
        let store = store().await;
        store.create("Hello world!".into()).await.unwrap();

        assert!(store.recent(0).await.unwrap().is_empty());
        assert_eq!(store.recent(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_like_missing() {
        let store = store().await;

        let missing = Uuid::new_v4().to_string();
        assert!(store.like(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "needs a running Redis at REDIS_URL"]
    async fn test_concurrent_likes() {
        let store = Arc::new(store().await);
        let id = store.create("Hello world!".into()).await.unwrap().id;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move { store.like(&id).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let thought = store.like(&id).await.unwrap().unwrap();
        assert_eq!(thought.hearts, 33);
    }
}
