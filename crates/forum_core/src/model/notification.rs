//! Notification record and typed per-kind payloads.
//!
//! # Responsibility
//! - Map the seven notification kinds to their stable numeric codes.
//! - Carry only the fields each kind needs.
//!
//! # Invariants
//! - Codes are `1..=7` and never reused for another kind.
//! - Reply-scoped kinds (`ReplyEdited`, `ReplyRemoved`) always carry a reply id.
//! - New notifications start unread.

use super::now_epoch_ms;
use super::reply::ReplyId;
use super::topic::TopicId;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NotificationId = Uuid;

/// Event kind behind a notification, with its persisted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewReply,
    Mention,
    TopicRetitled,
    TopicMoved,
    TopicRetitledAndMoved,
    ReplyEdited,
    ReplyRemoved,
}

impl NotificationKind {
    pub fn code(self) -> u8 {
        match self {
            Self::NewReply => 1,
            Self::Mention => 2,
            Self::TopicRetitled => 3,
            Self::TopicMoved => 4,
            Self::TopicRetitledAndMoved => 5,
            Self::ReplyEdited => 6,
            Self::ReplyRemoved => 7,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::NewReply),
            2 => Some(Self::Mention),
            3 => Some(Self::TopicRetitled),
            4 => Some(Self::TopicMoved),
            5 => Some(Self::TopicRetitledAndMoved),
            6 => Some(Self::ReplyEdited),
            7 => Some(Self::ReplyRemoved),
            _ => None,
        }
    }

    /// Whether payloads of this kind point at a single reply.
    pub fn is_reply_scoped(self) -> bool {
        matches!(self, Self::ReplyEdited | Self::ReplyRemoved)
    }
}

/// Topic-level event details: who acted on which topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEvent {
    /// Username of the acting user.
    pub actor: String,
    pub topic_id: TopicId,
    pub topic_title: String,
}

/// Reply-level event details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEvent {
    pub actor: String,
    pub topic_id: TopicId,
    pub topic_title: String,
    pub reply_id: ReplyId,
}

/// Kind-tagged notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    NewReply(TopicEvent),
    Mention(TopicEvent),
    TopicRetitled(TopicEvent),
    TopicMoved(TopicEvent),
    TopicRetitledAndMoved(TopicEvent),
    ReplyEdited(ReplyEvent),
    ReplyRemoved(ReplyEvent),
}

impl NotificationPayload {
    /// Builds the payload variant for `kind` from flat stored fields.
    ///
    /// Returns `None` when a reply-scoped kind has no reply id.
    pub fn from_parts(
        kind: NotificationKind,
        actor: String,
        topic_id: TopicId,
        topic_title: String,
        reply_id: Option<ReplyId>,
    ) -> Option<Self> {
        if kind.is_reply_scoped() {
            let event = ReplyEvent {
                actor,
                topic_id,
                topic_title,
                reply_id: reply_id?,
            };
            return Some(match kind {
                NotificationKind::ReplyEdited => Self::ReplyEdited(event),
                _ => Self::ReplyRemoved(event),
            });
        }

        let event = TopicEvent {
            actor,
            topic_id,
            topic_title,
        };
        Some(match kind {
            NotificationKind::NewReply => Self::NewReply(event),
            NotificationKind::Mention => Self::Mention(event),
            NotificationKind::TopicRetitled => Self::TopicRetitled(event),
            NotificationKind::TopicMoved => Self::TopicMoved(event),
            _ => Self::TopicRetitledAndMoved(event),
        })
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::NewReply(_) => NotificationKind::NewReply,
            Self::Mention(_) => NotificationKind::Mention,
            Self::TopicRetitled(_) => NotificationKind::TopicRetitled,
            Self::TopicMoved(_) => NotificationKind::TopicMoved,
            Self::TopicRetitledAndMoved(_) => NotificationKind::TopicRetitledAndMoved,
            Self::ReplyEdited(_) => NotificationKind::ReplyEdited,
            Self::ReplyRemoved(_) => NotificationKind::ReplyRemoved,
        }
    }

    pub fn code(&self) -> u8 {
        self.kind().code()
    }

    pub fn actor(&self) -> &str {
        match self {
            Self::NewReply(event)
            | Self::Mention(event)
            | Self::TopicRetitled(event)
            | Self::TopicMoved(event)
            | Self::TopicRetitledAndMoved(event) => event.actor.as_str(),
            Self::ReplyEdited(event) | Self::ReplyRemoved(event) => event.actor.as_str(),
        }
    }

    pub fn topic_id(&self) -> TopicId {
        match self {
            Self::NewReply(event)
            | Self::Mention(event)
            | Self::TopicRetitled(event)
            | Self::TopicMoved(event)
            | Self::TopicRetitledAndMoved(event) => event.topic_id,
            Self::ReplyEdited(event) | Self::ReplyRemoved(event) => event.topic_id,
        }
    }

    pub fn topic_title(&self) -> &str {
        match self {
            Self::NewReply(event)
            | Self::Mention(event)
            | Self::TopicRetitled(event)
            | Self::TopicMoved(event)
            | Self::TopicRetitledAndMoved(event) => event.topic_title.as_str(),
            Self::ReplyEdited(event) | Self::ReplyRemoved(event) => event.topic_title.as_str(),
        }
    }

    pub fn reply_id(&self) -> Option<ReplyId> {
        match self {
            Self::ReplyEdited(event) | Self::ReplyRemoved(event) => Some(event.reply_id),
            _ => None,
        }
    }
}

/// Stored notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// Recipient ("master") of the notification.
    pub recipient: UserId,
    pub read: bool,
    pub created_at: i64,
    pub payload: NotificationPayload,
}

impl Notification {
    /// Creates an unread notification stamped with the current time.
    pub fn new(recipient: UserId, payload: NotificationPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            read: false,
            created_at: now_epoch_ms(),
            payload,
        }
    }
}

/// Unread-list projection; recipient and read flag are implied by the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadNotification {
    pub id: NotificationId,
    pub created_at: i64,
    pub payload: NotificationPayload,
}
