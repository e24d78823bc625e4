//! Ledger ("bill") accessors.
//!
//! # Invariants
//! - Bills are only written through `apply_credit`, which changes the balance
//!   and records the bill in one immediate SQLite transaction; either both
//!   land or neither does.

use crate::model::bill::{Bill, BillKind};
use crate::model::user::UserId;
use crate::repo::store::{parse_uuid, RepoError, RepoResult, SqliteForumStore};
use crate::repo::user_repo::add_to_balance;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

pub trait BillRepository {
    /// Lists one user's ledger entries, newest first.
    fn list_bills(&self, owner: UserId) -> RepoResult<Vec<Bill>>;
    /// Adds `bill.amount` to the owner's balance and records `bill`.
    fn apply_credit(&self, bill: &Bill) -> RepoResult<()>;
}

impl BillRepository for SqliteForumStore<'_> {
    fn list_bills(&self, owner: UserId) -> RepoResult<Vec<Bill>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message, kind, created_at, amount, owner
             FROM bills
             WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC;",
        )?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut bills = Vec::new();
        while let Some(row) = rows.next()? {
            bills.push(parse_bill_row(row)?);
        }
        Ok(bills)
    }

    fn apply_credit(&self, bill: &Bill) -> RepoResult<()> {
        // The store only holds a shared borrow, so nesting is not checked.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        add_to_balance(&tx, bill.owner, bill.amount)?;
        insert_bill_row(&tx, bill)?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_bill_row(conn: &Connection, bill: &Bill) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO bills (id, message, kind, created_at, amount, owner)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            bill.id.to_string(),
            bill.message.as_str(),
            bill.kind.code(),
            bill.created_at,
            bill.amount,
            bill.owner.to_string(),
        ],
    )?;
    Ok(())
}

fn parse_bill_row(row: &Row<'_>) -> RepoResult<Bill> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner")?;
    let code: i64 = row.get("kind")?;
    let kind = u8::try_from(code)
        .ok()
        .and_then(BillKind::from_code)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid bill kind `{code}` in bills.kind")))?;

    Ok(Bill {
        id: parse_uuid(&id_text, "bills.id")?,
        message: row.get("message")?,
        kind,
        created_at: row.get("created_at")?,
        amount: row.get("amount")?,
        owner: parse_uuid(&owner_text, "bills.owner")?,
    })
}
