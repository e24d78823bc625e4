//! Notification accessors.
//!
//! # Invariants
//! - Payload fields are stored flat and rebuilt from the kind code on read.
//! - Unread listing filters on `is_read = 0` and imposes no ordering.

use crate::model::notification::{
    Notification, NotificationId, NotificationKind, NotificationPayload, UnreadNotification,
};
use crate::model::user::UserId;
use crate::repo::store::{
    bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult, SqliteForumStore,
};
use rusqlite::{params, Row};

pub trait NotificationRepository {
    fn insert_notification(&self, notification: &Notification) -> RepoResult<NotificationId>;
    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>>;
    fn list_unread_notifications(&self, recipient: UserId)
        -> RepoResult<Vec<UnreadNotification>>;
    fn set_notification_read(&self, id: NotificationId, read: bool) -> RepoResult<()>;
}

impl NotificationRepository for SqliteForumStore<'_> {
    fn insert_notification(&self, notification: &Notification) -> RepoResult<NotificationId> {
        let payload = &notification.payload;
        self.conn.execute(
            "INSERT INTO notifications (
                id,
                kind,
                is_read,
                created_at,
                master,
                actor,
                topic_id,
                topic_title,
                reply_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                notification.id.to_string(),
                payload.code(),
                bool_to_int(notification.read),
                notification.created_at,
                notification.recipient.to_string(),
                payload.actor(),
                payload.topic_id().to_string(),
                payload.topic_title(),
                payload.reply_id().map(|id| id.to_string()),
            ],
        )?;
        Ok(notification.id)
    }

    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                kind,
                is_read,
                created_at,
                master,
                actor,
                topic_id,
                topic_title,
                reply_id
             FROM notifications
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let master_text: String = row.get("master")?;
            return Ok(Some(Notification {
                id: parse_uuid(&row.get::<_, String>("id")?, "notifications.id")?,
                recipient: parse_uuid(&master_text, "notifications.master")?,
                read: int_to_bool(row.get("is_read")?, "notifications.is_read")?,
                created_at: row.get("created_at")?,
                payload: parse_payload(row)?,
            }));
        }
        Ok(None)
    }

    fn list_unread_notifications(
        &self,
        recipient: UserId,
    ) -> RepoResult<Vec<UnreadNotification>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                kind,
                created_at,
                actor,
                topic_id,
                topic_title,
                reply_id
             FROM notifications
             WHERE master = ?1
               AND is_read = 0;",
        )?;
        let mut rows = stmt.query([recipient.to_string()])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(UnreadNotification {
                id: parse_uuid(&row.get::<_, String>("id")?, "notifications.id")?,
                created_at: row.get("created_at")?,
                payload: parse_payload(row)?,
            });
        }
        Ok(notifications)
    }

    fn set_notification_read(&self, id: NotificationId, read: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications SET is_read = ?1 WHERE id = ?2;",
            params![bool_to_int(read), id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "notification",
                id,
            });
        }
        Ok(())
    }
}

fn parse_payload(row: &Row<'_>) -> RepoResult<NotificationPayload> {
    let code: i64 = row.get("kind")?;
    let kind = u8::try_from(code)
        .ok()
        .and_then(NotificationKind::from_code)
        .ok_or_else(|| {
            RepoError::InvalidData(format!("invalid notification kind `{code}` in notifications.kind"))
        })?;

    let topic_text: String = row.get("topic_id")?;
    let topic_id = parse_uuid(&topic_text, "notifications.topic_id")?;
    let reply_id = match row.get::<_, Option<String>>("reply_id")? {
        Some(value) => Some(parse_uuid(&value, "notifications.reply_id")?),
        None => None,
    };

    NotificationPayload::from_parts(
        kind,
        row.get("actor")?,
        topic_id,
        row.get("topic_title")?,
        reply_id,
    )
    .ok_or_else(|| {
        RepoError::InvalidData(format!(
            "notification kind `{code}` requires notifications.reply_id"
        ))
    })
}
