use forum_api::{ForumHandlers, NoticeView};
use forum_core::db::{open_db_from_config, open_db_in_memory};
use forum_core::{
    BillRepository, ForumConfig, RefreshBus, RefreshSignal, ReplyRepository, RequestContext,
    RewardConfig, SqliteForumStore, Topic, TopicRepository, User, UserRepository,
};
use serde_json::json;
use uuid::Uuid;

fn seed_user(conn: &rusqlite::Connection, name: &str) -> User {
    let store = SqliteForumStore::try_new(conn).unwrap();
    let user = User::new(name);
    store.create_user(&user).unwrap();
    user
}

fn seed_topic(conn: &rusqlite::Connection, author: &User) -> Topic {
    let store = SqliteForumStore::try_new(conn).unwrap();
    let topic = Topic::new("Handlers", author.id);
    store.create_topic(&topic).unwrap();
    topic
}

fn ctx(user: &User) -> RequestContext {
    RequestContext::new(user.clone(), RewardConfig { new_reply: 5 })
}

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

#[test]
fn create_reply_returns_success_without_data() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();

    let response = handlers.create_reply(
        &ctx(&bob),
        &body(json!({"topic": topic.id, "content": "hello @alice"})),
    );

    assert!(response.ok, "{}", response.message);
    assert!(response.data.is_none());
    let store = SqliteForumStore::try_new(&conn).unwrap();
    assert_eq!(store.count_replies(topic.id).unwrap(), 1);
    assert_eq!(store.get_user(bob.id).unwrap().unwrap().balance, 5);
}

#[test]
fn malformed_body_fails_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();

    let not_json = handlers.create_reply(&ctx(&alice), b"{not json");
    assert!(!not_json.ok);
    assert!(not_json.message.starts_with("malformed request body"));

    let bad_id = handlers.create_reply(
        &ctx(&alice),
        &body(json!({"topic": "not-a-uuid", "content": "x"})),
    );
    assert!(!bad_id.ok);

    let missing_id = handlers.edit_reply(&ctx(&alice), &body(json!({"content": "x"})));
    assert!(!missing_id.ok);

    let store = SqliteForumStore::try_new(&conn).unwrap();
    assert_eq!(store.count_replies(topic.id).unwrap(), 0);
}

#[test]
fn unknown_topic_reports_lookup_message() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();

    let missing = Uuid::new_v4();
    let response = handlers.create_reply(
        &ctx(&alice),
        &body(json!({"topic": missing, "content": "hi"})),
    );

    assert!(!response.ok);
    assert_eq!(response.message, format!("topic not found: {missing}"));
}

#[test]
fn list_replies_returns_page_envelope() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();
    for idx in 0..21 {
        let response = handlers.create_reply(
            &ctx(&alice),
            &body(json!({"topic": topic.id, "content": format!("reply {idx}")})),
        );
        assert!(response.ok, "{}", response.message);
    }

    let response = handlers.list_replies(&body(json!({"page": -1, "topic": topic.id})));
    assert!(response.ok, "{}", response.message);
    let data = response.data.unwrap();
    assert_eq!(data["per"], 20);
    assert_eq!(data["page"], 2);
    assert_eq!(data["total"], 2);
    assert_eq!(data["list"].as_array().unwrap().len(), 1);
    assert_eq!(data["list"][0]["content"], "reply 20");
}

#[test]
fn notices_are_listed_and_marked_read() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();

    let created = handlers.create_reply(
        &ctx(&bob),
        &body(json!({"topic": topic.id, "content": "first!"})),
    );
    assert!(created.ok, "{}", created.message);

    let listed = handlers.list_unread_notices(&ctx(&alice));
    assert!(listed.ok, "{}", listed.message);
    let notices: Vec<NoticeView> = serde_json::from_value(listed.data.unwrap()).unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, 1);
    assert_eq!(notices[0].user, "bob");
    assert_eq!(notices[0].topic_id, topic.id);
    assert_eq!(notices[0].topic_title, "Handlers");
    assert_eq!(notices[0].reply_id, None);

    let marked = handlers.mark_notice_read(
        &ctx(&alice),
        &body(json!({"id": notices[0].id, "read": true})),
    );
    assert!(marked.ok, "{}", marked.message);

    let after = handlers.list_unread_notices(&ctx(&alice));
    assert_eq!(after.data.unwrap(), json!([]));
}

#[test]
fn edit_by_moderator_produces_removal_notice() {
    let conn = open_db_in_memory().unwrap();
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::new(&conn, RefreshBus::new(8)).unwrap();
    handlers.create_reply(
        &ctx(&bob),
        &body(json!({"topic": topic.id, "content": "spam"})),
    );
    let store = SqliteForumStore::try_new(&conn).unwrap();
    let reply = store.paginate_replies(topic.id, 1, 20).unwrap().remove(0);

    let response = handlers.edit_reply(&ctx(&alice), &body(json!({"id": reply.id, "content": ""})));
    assert!(response.ok, "{}", response.message);

    let listed = handlers.list_unread_notices(&ctx(&bob));
    let notices: Vec<NoticeView> = serde_json::from_value(listed.data.unwrap()).unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].kind, 7);
    assert_eq!(notices[0].reply_id, Some(reply.id));
}

#[test]
fn handlers_built_from_config_use_its_database_reward_and_bus() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("forum.sqlite3");
    let config = ForumConfig::from_toml_str(&format!(
        "[reward]\nnew_reply = 7\n\n[database]\npath = {:?}\n\n[refresh]\ncapacity = 4\n",
        db_path.display().to_string()
    ))
    .unwrap();

    let conn = open_db_from_config(&config.database).unwrap();
    assert!(db_path.exists());
    let alice = seed_user(&conn, "alice");
    let bob = seed_user(&conn, "bob");
    let topic = seed_topic(&conn, &alice);
    let handlers = ForumHandlers::from_config(&conn, &config).unwrap();
    let mut rx = handlers.refresh_bus().subscribe();

    let response = handlers.create_reply(
        &RequestContext::from_config(bob.clone(), &config),
        &body(json!({"topic": topic.id, "content": "configured"})),
    );

    assert!(response.ok, "{}", response.message);
    let store = SqliteForumStore::try_new(&conn).unwrap();
    assert_eq!(store.get_user(bob.id).unwrap().unwrap().balance, 7);
    assert_eq!(store.list_bills(bob.id).unwrap()[0].amount, 7);
    assert_eq!(rx.try_recv().unwrap(), RefreshSignal::REPLY_LIST);
    assert_eq!(rx.try_recv().unwrap(), RefreshSignal::NOTICE_LIST);
}
