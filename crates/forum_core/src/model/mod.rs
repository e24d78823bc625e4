//! Forum domain model for the reply/notification core.
//!
//! # Responsibility
//! - Define canonical records read and written by the reply workflow.
//! - Keep notification payloads typed per event kind.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Timestamps are Unix epoch milliseconds (UTC).
//! - Replies are never physically removed; an empty body marks removal.

pub mod bill;
pub mod notification;
pub mod reply;
pub mod topic;
pub mod user;

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
