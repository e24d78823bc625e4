//! Reward ledger: balance credits with an auditable bill per credit.
//!
//! # Invariants
//! - Zero amounts perform no writes.
//! - The balance delta always equals the recorded bill amount; both are
//!   written in one store transaction.

use crate::model::bill::{Bill, BillKind};
use crate::model::user::UserId;
use crate::repo::bill_repo::BillRepository;
use crate::repo::store::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LedgerError {
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "ledger owner not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UserNotFound(_) => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "user", id } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct RewardLedger<R: BillRepository> {
    repo: R,
}

impl<R: BillRepository> RewardLedger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Credits `amount` to `user` for replying under `topic_title`.
    ///
    /// Returns the recorded bill, or `None` when `amount` is zero.
    pub fn credit_for_reply(
        &self,
        user: UserId,
        topic_title: &str,
        amount: i64,
    ) -> Result<Option<Bill>, LedgerError> {
        if amount == 0 {
            return Ok(None);
        }

        let bill = Bill::new(BillKind::ReplyReward, user, amount, topic_title);
        self.repo.apply_credit(&bill)?;
        info!(
            "event=ledger_credit module=ledger status=ok user={user} bill={} amount={amount}",
            bill.id
        );
        Ok(Some(bill))
    }
}
