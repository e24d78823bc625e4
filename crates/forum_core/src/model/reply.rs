//! Reply record.
//!
//! # Invariants
//! - A reply belongs to exactly one topic and one author for its lifetime.
//! - Edits replace `content` only.
//! - Empty `content` represents a reply removed by a moderator or its author.

use super::now_epoch_ms;
use super::topic::TopicId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReplyId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub topic: TopicId,
    pub author: UserId,
    pub content: String,
    pub created_at: i64,
}

impl Reply {
    /// Creates a reply stamped with the current time.
    pub fn new(topic: TopicId, author: UserId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic,
            author,
            content: content.into(),
            created_at: now_epoch_ms(),
        }
    }
}
