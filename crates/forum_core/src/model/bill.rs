//! Balance ledger entry ("bill").
//!
//! # Invariants
//! - `amount` equals the balance delta applied to `owner` for this entry.

use super::now_epoch_ms;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type BillId = Uuid;

/// Reason a ledger entry was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    /// Reward paid for posting a new reply.
    ReplyReward,
}

impl BillKind {
    /// Numeric code persisted in storage.
    pub fn code(self) -> u8 {
        match self {
            Self::ReplyReward => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(Self::ReplyReward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    /// Context shown in the ledger, e.g. the rewarded topic's title.
    pub message: String,
    pub kind: BillKind,
    pub created_at: i64,
    /// Signed balance delta.
    pub amount: i64,
    pub owner: UserId,
}

impl Bill {
    pub fn new(kind: BillKind, owner: UserId, amount: i64, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at: now_epoch_ms(),
            amount,
            owner,
        }
    }
}
