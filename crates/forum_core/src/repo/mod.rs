//! Document store accessor: repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Define per-entity data access contracts consumed by forum services.
//! - Isolate SQLite query details from workflow orchestration.
//!
//! # Invariants
//! - Update-by-id paths return `NotFound` when no row matched.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Nothing is cached; every read goes to the store.

pub mod bill_repo;
pub mod notification_repo;
pub mod reply_repo;
pub mod store;
pub mod topic_repo;
pub mod user_repo;
