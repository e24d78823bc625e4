//! Topic record and its denormalized last-reply metadata.

use super::now_epoch_ms;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TopicId = Uuid;

/// Discussion thread owned by the topic collaborator.
///
/// The reply core reads `title`/`author` and refreshes `last_reply` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub author: UserId,
    pub created_at: i64,
    pub last_reply: Option<LastReply>,
}

/// Who replied last and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastReply {
    pub user_name: String,
    pub replied_at: i64,
}

impl Topic {
    /// Creates a topic with a generated ID and no replies yet.
    pub fn new(title: impl Into<String>, author: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author,
            created_at: now_epoch_ms(),
            last_reply: None,
        }
    }
}
