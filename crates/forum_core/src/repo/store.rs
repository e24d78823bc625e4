//! Shared repository error type and the SQLite-backed forum store.

use crate::db::{ensure_current, DbError};
use crate::repo::bill_repo::BillRepository;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::reply_repo::ReplyRepository;
use crate::repo::topic_repo::TopicRepository;
use crate::repo::user_repo::UserRepository;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for forum persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: Uuid,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything the reply workflow needs from the document store.
pub trait ForumStore:
    UserRepository + TopicRepository + ReplyRepository + NotificationRepository + BillRepository
{
}

impl<T> ForumStore for T where
    T: UserRepository + TopicRepository + ReplyRepository + NotificationRepository + BillRepository
{
}

/// SQLite-backed implementation of every forum repository contract.
///
/// Borrowing the connection keeps the store `Copy`, so services can each hold
/// their own handle.
#[derive(Debug, Clone, Copy)]
pub struct SqliteForumStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteForumStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `Db(SchemaBehind | SchemaAhead | MissingTables)` when the connection
    ///   does not carry the current forum schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_current(conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
