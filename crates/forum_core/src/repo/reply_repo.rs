//! Reply accessors: insert, lookup, content update, count and pagination.
//!
//! # Invariants
//! - Content updates never touch `topic` or `author`.
//! - Pagination order is creation time, then insertion order.

use crate::model::reply::{Reply, ReplyId};
use crate::model::topic::TopicId;
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteForumStore};
use rusqlite::{params, Row};

const REPLY_SELECT_SQL: &str = "SELECT id, topic, author, content, created_at FROM replies";

pub trait ReplyRepository {
    fn create_reply(&self, reply: &Reply) -> RepoResult<ReplyId>;
    fn get_reply(&self, id: ReplyId) -> RepoResult<Option<Reply>>;
    fn update_reply_content(&self, id: ReplyId, content: &str) -> RepoResult<()>;
    fn count_replies(&self, topic: TopicId) -> RepoResult<u64>;
    /// Returns one 1-based page of replies under `topic`.
    fn paginate_replies(&self, topic: TopicId, page: u32, per_page: u32)
        -> RepoResult<Vec<Reply>>;
}

impl ReplyRepository for SqliteForumStore<'_> {
    fn create_reply(&self, reply: &Reply) -> RepoResult<ReplyId> {
        self.conn.execute(
            "INSERT INTO replies (id, topic, author, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                reply.id.to_string(),
                reply.topic.to_string(),
                reply.author.to_string(),
                reply.content.as_str(),
                reply.created_at,
            ],
        )?;
        Ok(reply.id)
    }

    fn get_reply(&self, id: ReplyId) -> RepoResult<Option<Reply>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPLY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reply_row(row)?));
        }
        Ok(None)
    }

    fn update_reply_content(&self, id: ReplyId, content: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE replies SET content = ?1 WHERE id = ?2;",
            params![content, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "reply", id });
        }
        Ok(())
    }

    fn count_replies(&self, topic: TopicId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM replies WHERE topic = ?1;",
            [topic.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative reply count `{count}`")))
    }

    fn paginate_replies(
        &self,
        topic: TopicId,
        page: u32,
        per_page: u32,
    ) -> RepoResult<Vec<Reply>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
        let mut stmt = self.conn.prepare(&format!(
            "{REPLY_SELECT_SQL}
             WHERE topic = ?1
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![topic.to_string(), i64::from(per_page), offset])?;
        let mut replies = Vec::new();
        while let Some(row) = rows.next()? {
            replies.push(parse_reply_row(row)?);
        }
        Ok(replies)
    }
}

fn parse_reply_row(row: &Row<'_>) -> RepoResult<Reply> {
    let id_text: String = row.get("id")?;
    let topic_text: String = row.get("topic")?;
    let author_text: String = row.get("author")?;
    Ok(Reply {
        id: parse_uuid(&id_text, "replies.id")?,
        topic: parse_uuid(&topic_text, "replies.topic")?,
        author: parse_uuid(&author_text, "replies.author")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}
