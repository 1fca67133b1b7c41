//! Process-local store for development and tests.
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    store::{StoreError, ThoughtStore},
    thought::{Thought, now_millis},
};

#[derive(Default)]
pub struct MemoryStore {
    // insertion order, which is also createdAt order
    thoughts: RwLock<Vec<Thought>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThoughtStore for MemoryStore {
    async fn create(&self, message: String) -> Result<Thought, StoreError> {
        let mut thoughts = self.thoughts.write();

        let mut created_at = now_millis();
        if let Some(last) = thoughts.last() {
            created_at = created_at.max(last.created_at);
        }

        let thought = Thought::new(Uuid::new_v4().to_string(), message, created_at);
        thoughts.push(thought.clone());

        Ok(thought)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Thought>, StoreError> {
        let thoughts = self.thoughts.read();

        Ok(thoughts.iter().rev().take(limit).cloned().collect())
    }

    async fn like(&self, id: &str) -> Result<Option<Thought>, StoreError> {
        let mut thoughts = self.thoughts.write();

        Ok(thoughts.iter_mut().find(|t| t.id == id).map(|thought| {
            thought.hearts += 1;
            thought.clone()
        }))
    }
}
