//! Forum user record as seen by the reply core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Registered forum member.
///
/// Only the fields the reply core reads are modeled; profile data belongs to
/// the account collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name, also the token used in `@name` mentions.
    pub name: String,
    /// Reward balance credited by the ledger.
    pub balance: i64,
}

impl User {
    /// Creates a user with a generated ID and zero balance.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance: 0,
        }
    }
}
