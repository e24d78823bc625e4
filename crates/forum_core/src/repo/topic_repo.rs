//! Topic accessors used by the reply core.
//!
//! Topic creation exists for seeding and tests; topic editing belongs to the
//! topic collaborator.

use crate::model::topic::{LastReply, Topic, TopicId};
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteForumStore};
use rusqlite::{params, Row};

const TOPIC_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    created_at,
    last_reply_user,
    last_reply_at
FROM topics";

pub trait TopicRepository {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    /// Refreshes the denormalized last-reply metadata.
    fn update_last_reply(&self, id: TopicId, user_name: &str, replied_at: i64) -> RepoResult<()>;
}

impl TopicRepository for SqliteForumStore<'_> {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId> {
        let (last_user, last_at) = match topic.last_reply.as_ref() {
            Some(last) => (Some(last.user_name.as_str()), Some(last.replied_at)),
            None => (None, None),
        };
        self.conn.execute(
            "INSERT INTO topics (
                id,
                title,
                author,
                created_at,
                last_reply_user,
                last_reply_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                topic.id.to_string(),
                topic.title.as_str(),
                topic.author.to_string(),
                topic.created_at,
                last_user,
                last_at,
            ],
        )?;
        Ok(topic.id)
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn update_last_reply(&self, id: TopicId, user_name: &str, replied_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics
             SET
                last_reply_user = ?1,
                last_reply_at = ?2
             WHERE id = ?3;",
            params![user_name, replied_at, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "topic", id });
        }
        Ok(())
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let id_text: String = row.get("id")?;
    let author_text: String = row.get("author")?;
    let last_reply = match (
        row.get::<_, Option<String>>("last_reply_user")?,
        row.get::<_, Option<i64>>("last_reply_at")?,
    ) {
        (Some(user_name), Some(replied_at)) => Some(LastReply {
            user_name,
            replied_at,
        }),
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "partial last reply metadata on topic `{id_text}`"
            )));
        }
    };

    Ok(Topic {
        id: parse_uuid(&id_text, "topics.id")?,
        title: row.get("title")?,
        author: parse_uuid(&author_text, "topics.author")?,
        created_at: row.get("created_at")?,
        last_reply,
    })
}
