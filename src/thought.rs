//! # Thought
//!
//! The only record the board stores.
//!
//! - **id**: UUID v4 string, assigned on creation, never reused
//! - **message**: 5 to 140 characters, immutable
//! - **hearts**: like counter, starts at 0, only ever incremented
//! - **createdAt**: creation instant in UTC, millisecond precision, sort key for listing
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::StoreError;

pub const MIN_MESSAGE_LEN: usize = 5;
pub const MAX_MESSAGE_LEN: usize = 140;
pub const RECENT_LIMIT: usize = 20;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub id: String,
    pub message: String,
    pub hearts: u64,
    pub created_at: DateTime<Utc>,
}

impl Thought {
    pub fn new(id: String, message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            message,
            hearts: 0,
            created_at,
        }
    }

    /// Rebuilds a thought from the raw fields a backend keeps.
    pub fn from_parts(
        id: String,
        message: String,
        hearts: i64,
        created_at_ms: i64,
    ) -> Result<Self, StoreError> {
        let hearts = u64::try_from(hearts).map_err(|_| StoreError::Corrupt {
            id: id.clone(),
            reason: format!("negative hearts {hearts}"),
        })?;

        let created_at =
            DateTime::from_timestamp_millis(created_at_ms).ok_or_else(|| StoreError::Corrupt {
                id: id.clone(),
                reason: format!("timestamp out of range {created_at_ms}"),
            })?;

        Ok(Self {
            id,
            message,
            hearts,
            created_at,
        })
    }
}

/// Current time truncated to the precision backends persist.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();

    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
