//! Forum use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into reply/notification use-cases.
//! - Keep API layers decoupled from storage details.

pub mod mention;
pub mod notification_service;
pub mod reply_workflow;
pub mod reward_ledger;
