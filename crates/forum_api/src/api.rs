//! Use-case level request handlers.
//!
//! # Responsibility
//! - Decode raw JSON request bodies into workflow requests.
//! - Return a uniform success/failure envelope for every call.
//!
//! # Invariants
//! - Handlers never panic on malformed input.
//! - Decoding happens before any storage write.
//! - Failure envelopes carry the first error's message only; side effects of
//!   an aborted sequence are not reported.

use forum_core::{
    EditReplyRequest, ForumConfig, NewReplyRequest, NotificationError, NotificationId, NotificationService,
    RefreshBus, RepoError, ReplyId, ReplyWorkflow, RequestContext, SqliteForumStore, TopicId,
    UnreadNotification, WorkflowError,
};
use log::warn;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result envelope returned by every handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable failure reason; empty on success.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    fn success(data: Option<Value>) -> Self {
        Self {
            ok: true,
            message: String::new(),
            data,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Handler-level error, rendered into a failure envelope.
#[derive(Debug)]
pub enum RequestError {
    MalformedBody(serde_json::Error),
    Workflow(WorkflowError),
    Notification(NotificationError),
    Encode(serde_json::Error),
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBody(err) => write!(f, "malformed request body: {err}"),
            Self::Workflow(err) => write!(f, "{err}"),
            Self::Notification(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode response: {err}"),
        }
    }
}

impl Error for RequestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedBody(err) | Self::Encode(err) => Some(err),
            Self::Workflow(err) => Some(err),
            Self::Notification(err) => Some(err),
        }
    }
}

impl From<WorkflowError> for RequestError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<NotificationError> for RequestError {
    fn from(value: NotificationError) -> Self {
        Self::Notification(value)
    }
}

#[derive(Debug, Deserialize)]
struct CreateReplyBody {
    topic: TopicId,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct EditReplyBody {
    id: ReplyId,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ListRepliesBody {
    page: i64,
    topic: TopicId,
}

#[derive(Debug, Deserialize)]
struct MarkNoticeBody {
    id: NotificationId,
    read: bool,
}

/// Flat wire shape of one unread notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeView {
    pub id: NotificationId,
    /// Numeric kind code (1..=7).
    #[serde(rename = "type")]
    pub kind: u8,
    pub date: i64,
    /// Acting username.
    pub user: String,
    pub topic_id: TopicId,
    pub topic_title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reply_id: Option<ReplyId>,
}

impl From<UnreadNotification> for NoticeView {
    fn from(value: UnreadNotification) -> Self {
        let payload = &value.payload;
        Self {
            id: value.id,
            kind: payload.code(),
            date: value.created_at,
            user: payload.actor().to_string(),
            topic_id: payload.topic_id(),
            topic_title: payload.topic_title().to_string(),
            reply_id: payload.reply_id(),
        }
    }
}

/// Reply and notice handlers bound to one store connection.
pub struct ForumHandlers<'conn> {
    workflow: ReplyWorkflow<SqliteForumStore<'conn>, RefreshBus>,
    notices: NotificationService<SqliteForumStore<'conn>>,
}

impl<'conn> ForumHandlers<'conn> {
    /// Binds handlers to a migrated connection and a refresh bus.
    pub fn new(conn: &'conn Connection, refresh: RefreshBus) -> Result<Self, RepoError> {
        let store = SqliteForumStore::try_new(conn)?;
        Ok(Self {
            workflow: ReplyWorkflow::new(store, refresh),
            notices: NotificationService::new(store),
        })
    }

    /// Binds handlers with a refresh bus sized by `config.refresh`.
    pub fn from_config(conn: &'conn Connection, config: &ForumConfig) -> Result<Self, RepoError> {
        Self::new(conn, RefreshBus::from_config(&config.refresh))
    }

    /// Bus carrying the refresh signals of every handler call.
    pub fn refresh_bus(&self) -> &RefreshBus {
        self.workflow.publisher()
    }

    /// `CreateReply {topic, content}`; success carries no data.
    pub fn create_reply(&self, ctx: &RequestContext, body: &[u8]) -> ApiResponse {
        respond("reply_create", || {
            let body: CreateReplyBody = decode(body)?;
            self.workflow.create_reply(
                ctx,
                &NewReplyRequest {
                    topic: body.topic,
                    content: body.content,
                },
            )?;
            Ok(None)
        })
    }

    /// `EditReply {id, content}`; success carries no data.
    pub fn edit_reply(&self, ctx: &RequestContext, body: &[u8]) -> ApiResponse {
        respond("reply_edit", || {
            let body: EditReplyBody = decode(body)?;
            self.workflow.edit_reply(
                ctx,
                &EditReplyRequest {
                    reply: body.id,
                    content: body.content,
                },
            )?;
            Ok(None)
        })
    }

    /// `ListReplies {page, topic}` → `{per, page, total, list}`.
    pub fn list_replies(&self, body: &[u8]) -> ApiResponse {
        respond("reply_list", || {
            let body: ListRepliesBody = decode(body)?;
            let page = self.workflow.list_replies(body.topic, body.page)?;
            encode(&page).map(Some)
        })
    }

    /// Unread notices of the current user as a list of [`NoticeView`].
    pub fn list_unread_notices(&self, ctx: &RequestContext) -> ApiResponse {
        respond("notice_list", || {
            let views = self
                .notices
                .list_unread(ctx.user.id)?
                .into_iter()
                .map(NoticeView::from)
                .collect::<Vec<_>>();
            encode(&views).map(Some)
        })
    }

    /// `MarkRead {id, read}`.
    ///
    /// The notice is not checked against `ctx.user`; any authenticated caller
    /// holding an id can flip its flag.
    pub fn mark_notice_read(&self, _ctx: &RequestContext, body: &[u8]) -> ApiResponse {
        respond("notice_read", || {
            let body: MarkNoticeBody = decode(body)?;
            self.notices.mark_read(body.id, body.read)?;
            Ok(None)
        })
    }
}

fn respond(
    event: &'static str,
    handler: impl FnOnce() -> Result<Option<Value>, RequestError>,
) -> ApiResponse {
    match handler() {
        Ok(data) => ApiResponse::success(data),
        Err(err) => {
            warn!("event={event} module=api status=error error={err}");
            ApiResponse::failure(err.to_string())
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestError> {
    serde_json::from_slice(body).map_err(RequestError::MalformedBody)
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RequestError> {
    serde_json::to_value(value).map_err(RequestError::Encode)
}
