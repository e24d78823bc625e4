//! Reply and notification workflow core of the forum backend.
//! This crate owns the business invariants; transport and sessions live
//! outside it.

pub mod config;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod refresh;
pub mod repo;
pub mod service;

pub use config::{
    ConfigError, DatabaseConfig, ForumConfig, LoggingConfig, RefreshConfig, RewardConfig,
};
pub use context::RequestContext;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::bill::{Bill, BillKind};
pub use model::notification::{
    Notification, NotificationId, NotificationKind, NotificationPayload, ReplyEvent, TopicEvent,
    UnreadNotification,
};
pub use model::reply::{Reply, ReplyId};
pub use model::topic::{LastReply, Topic, TopicId};
pub use model::user::{User, UserId};
pub use refresh::{RefreshBus, RefreshPublisher, RefreshSignal, MAX_REFRESH_CAPACITY};
pub use repo::bill_repo::BillRepository;
pub use repo::notification_repo::NotificationRepository;
pub use repo::reply_repo::ReplyRepository;
pub use repo::store::{ForumStore, RepoError, RepoResult, SqliteForumStore};
pub use repo::topic_repo::TopicRepository;
pub use repo::user_repo::UserRepository;
pub use service::mention::{extract_mention_tokens, MentionScanner, MAX_MENTION_MATCHES};
pub use service::notification_service::{NotificationError, NotificationService};
pub use service::reply_workflow::{
    CreateReplyOutcome, EditReplyOutcome, EditReplyRequest, NewReplyRequest, ReplyPage,
    ReplyWorkflow, WorkflowError, LAST_PAGE, REPLIES_PER_PAGE,
};
pub use service::reward_ledger::{LedgerError, RewardLedger};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
