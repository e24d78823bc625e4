//! Forum store bootstrap: connection setup, schema migrations and the schema
//! check every store handle runs before touching forum tables.
//!
//! # Invariants
//! - `PRAGMA user_version` holds the version of the last applied migration.
//! - A connection is usable by repositories only after `ensure_current`
//!   passes; `open_db*` run it for you.

use log::warn;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_from_config, open_db_in_memory};

/// Tables a current forum schema exposes.
pub const FORUM_TABLES: &[&str] = &["users", "topics", "replies", "notifications", "bills"];

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Schema was written by a newer build.
    SchemaAhead { found: u32, supported: u32 },
    /// Pending migrations have not been applied to this connection.
    SchemaBehind { found: u32, expected: u32 },
    /// Version is current but some forum tables are gone.
    MissingTables(Vec<&'static str>),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaAhead { found, supported } => write!(
                f,
                "forum schema v{found} is newer than this build (supports up to v{supported})"
            ),
            Self::SchemaBehind { found, expected } => write!(
                f,
                "forum schema v{found} needs migrating to v{expected}; open it with open_db"
            ),
            Self::MissingTables(tables) => {
                write!(f, "forum schema is missing tables: {}", tables.join(", "))
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Confirms the connection carries the latest forum schema.
///
/// # Errors
/// - `SchemaBehind` / `SchemaAhead` when the version differs from
///   [`migrations::latest_version`].
/// - `MissingTables` listing every absent entry of [`FORUM_TABLES`].
pub fn ensure_current(conn: &Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let expected = migrations::latest_version();
    if found < expected {
        return Err(DbError::SchemaBehind { found, expected });
    }
    if found > expected {
        return Err(DbError::SchemaAhead {
            found,
            supported: expected,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
    )?;
    let mut missing = Vec::new();
    for table in FORUM_TABLES {
        let present: bool = stmt.query_row([*table], |row| row.get(0))?;
        if !present {
            missing.push(*table);
        }
    }
    if !missing.is_empty() {
        warn!(
            "event=schema_check module=db status=error version={found} missing={}",
            missing.join(",")
        );
        return Err(DbError::MissingTables(missing));
    }
    Ok(())
}
