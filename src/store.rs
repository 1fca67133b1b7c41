use async_trait::async_trait;
use thiserror::Error;

use crate::thought::Thought;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt thought {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Persistence for the thought collection.
///
/// Implementations own id and timestamp assignment, and must perform
/// [`ThoughtStore::like`] as a single atomic step.
#[async_trait]
pub trait ThoughtStore: Send + Sync {
    /// Persists a new thought with zero hearts.
    async fn create(&self, message: String) -> Result<Thought, StoreError>;

    /// Newest first, at most `limit` thoughts.
    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError>;

    /// Adds one heart. `None` when no thought has this id.
    async fn like(&self, id: &str) -> Result<Option<Thought>, StoreError>;
}
