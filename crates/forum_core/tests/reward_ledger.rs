use forum_core::db::open_db_in_memory;
use forum_core::{
    BillKind, BillRepository, LedgerError, RewardLedger, SqliteForumStore, User, UserRepository,
};
use uuid::Uuid;

#[test]
fn zero_amount_performs_no_writes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteForumStore::try_new(&conn).unwrap();
    let user = User::new("bob");
    store.create_user(&user).unwrap();

    let bill = RewardLedger::new(store)
        .credit_for_reply(user.id, "Topic", 0)
        .unwrap();

    assert!(bill.is_none());
    assert_eq!(store.get_user(user.id).unwrap().unwrap().balance, 0);
    assert!(store.list_bills(user.id).unwrap().is_empty());
}

#[test]
fn credit_matches_bill_amount() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteForumStore::try_new(&conn).unwrap();
    let user = User::new("bob");
    store.create_user(&user).unwrap();
    let ledger = RewardLedger::new(store);

    let bill = ledger
        .credit_for_reply(user.id, "First topic", 50)
        .unwrap()
        .unwrap();
    assert_eq!(bill.kind, BillKind::ReplyReward);
    assert_eq!(bill.amount, 50);

    ledger.credit_for_reply(user.id, "Second topic", 50).unwrap();

    assert_eq!(store.get_user(user.id).unwrap().unwrap().balance, 100);
    let bills = store.list_bills(user.id).unwrap();
    assert_eq!(bills.len(), 2);
    assert_eq!(bills.iter().map(|bill| bill.amount).sum::<i64>(), 100);
    assert!(bills.iter().any(|entry| entry.message == "First topic" && entry.id == bill.id));
}

#[test]
fn unknown_user_is_reported_without_writing_a_bill() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteForumStore::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = RewardLedger::new(store)
        .credit_for_reply(missing, "Topic", 10)
        .unwrap_err();

    assert!(matches!(err, LedgerError::UserNotFound(id) if id == missing));
    let bills: i64 = conn
        .query_row("SELECT COUNT(*) FROM bills;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(bills, 0);
}

#[test]
fn failed_bill_insert_rolls_back_balance() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteForumStore::try_new(&conn).unwrap();
    let user = User::new("bob");
    store.create_user(&user).unwrap();
    conn.execute_batch("DROP TABLE bills;").unwrap();

    let err = RewardLedger::new(store)
        .credit_for_reply(user.id, "Topic", 25)
        .unwrap_err();

    assert!(matches!(err, LedgerError::Repo(_)));
    assert_eq!(store.get_user(user.id).unwrap().unwrap().balance, 0);
}
