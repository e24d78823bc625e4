//! User accessors: lookup by id or names and balance increments.

use crate::model::user::{User, UserId};
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteForumStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, balance FROM users";

/// Repository interface for user records.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Resolves many usernames in one query; unknown names are skipped.
    fn find_users_by_names(&self, names: &[String]) -> RepoResult<Vec<User>>;
    /// Adds `amount` (possibly negative) to the user's balance.
    fn increment_balance(&self, id: UserId, amount: i64) -> RepoResult<()>;
}

impl UserRepository for SqliteForumStore<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (id, name, balance) VALUES (?1, ?2, ?3);",
            params![user.id.to_string(), user.name.as_str(), user.balance],
        )?;
        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_users_by_names(&self, names: &[String]) -> RepoResult<Vec<User>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!("{USER_SELECT_SQL} WHERE name IN ({placeholders}) ORDER BY name ASC;");
        let bind_values = names
            .iter()
            .map(|name| Value::Text(name.clone()))
            .collect::<Vec<_>>();

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn increment_balance(&self, id: UserId, amount: i64) -> RepoResult<()> {
        add_to_balance(self.conn, id, amount)
    }
}

/// Balance increment shared with the ledger's credit transaction.
pub(crate) fn add_to_balance(conn: &Connection, id: UserId, amount: i64) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE users SET balance = balance + ?1 WHERE id = ?2;",
        params![amount, id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound { entity: "user", id });
    }
    Ok(())
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get("name")?,
        balance: row.get("balance")?,
    })
}
