//! Ordered forum schema steps.
//!
//! Each step records its own version in `PRAGMA user_version` as it lands,
//! and all pending steps share one transaction.

use crate::db::{schema_version, DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "forum_tables",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "unread_and_ledger_indexes",
        sql: include_str!("0002_notification_index.sql"),
    },
];

/// Version of the newest forum schema this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings the forum schema up to [`latest_version`].
///
/// Returns how many steps were applied; `0` when already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::SchemaAhead {
            found,
            supported: latest,
        });
    }

    let pending = STEPS
        .iter()
        .skip_while(|step| step.version <= found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from={found} to={latest} steps={}",
        pending.len()
    );
    Ok(pending.len())
}
