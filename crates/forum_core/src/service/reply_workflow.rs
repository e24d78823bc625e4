//! Reply create/edit/list workflow.
//!
//! # Responsibility
//! - Persist replies and keep topic last-reply metadata current.
//! - Fan out new-reply, mention and edit/removal notifications.
//! - Pay the configured new-reply reward.
//! - Publish reply/notice list refresh signals.
//!
//! # Invariants
//! - Nobody is notified about their own action.
//! - Steps run in a fixed order as independent writes. The first failing
//!   step aborts the rest; earlier writes stay committed.
//! - Edits never change a reply's author or topic.
//!
//! # Concurrency
//! No locking is done across requests. The unchanged-content check in
//! `edit_reply` is not guarded against concurrent edits, so two racing edits
//! are last-writer-wins.

use crate::context::RequestContext;
use crate::model::notification::{NotificationKind, NotificationPayload, ReplyEvent, TopicEvent};
use crate::model::reply::{Reply, ReplyId};
use crate::model::topic::{Topic, TopicId};
use crate::model::user::UserId;
use crate::refresh::{RefreshPublisher, RefreshSignal};
use crate::repo::store::{ForumStore, RepoError};
use crate::service::mention::MentionScanner;
use crate::service::notification_service::{NotificationError, NotificationService};
use crate::service::reward_ledger::{LedgerError, RewardLedger};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed reply page size.
pub const REPLIES_PER_PAGE: u32 = 20;
/// Page number that resolves to the last page.
pub const LAST_PAGE: i64 = -1;

#[derive(Debug)]
pub enum WorkflowError {
    /// Request failed validation; nothing was written.
    InvalidRequest(&'static str),
    TopicNotFound(TopicId),
    ReplyNotFound(ReplyId),
    Notification(NotificationError),
    Ledger(LedgerError),
    Repo(RepoError),
}

impl Display for WorkflowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest(message) => write!(f, "{message}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::ReplyNotFound(id) => write!(f, "reply not found: {id}"),
            Self::Notification(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkflowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notification(err) => Some(err),
            Self::Ledger(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WorkflowError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "topic", id } => Self::TopicNotFound(id),
            RepoError::NotFound { entity: "reply", id } => Self::ReplyNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<NotificationError> for WorkflowError {
    fn from(value: NotificationError) -> Self {
        Self::Notification(value)
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl WorkflowError {
    pub fn is_validation(&self) -> bool {
        match self {
            Self::InvalidRequest(_) => true,
            Self::Notification(err) => err.is_validation(),
            _ => false,
        }
    }
}

/// Decoded "new reply" submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReplyRequest {
    pub topic: TopicId,
    pub content: String,
}

/// Decoded "edit reply" submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReplyRequest {
    pub reply: ReplyId,
    pub content: String,
}

/// What `create_reply` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReplyOutcome {
    pub reply: Reply,
    /// Recipients notified, in notification order.
    pub notified: Vec<UserId>,
    /// Credited amount, when a reward was paid.
    pub reward: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditReplyOutcome {
    /// Trimmed content matched the stored content; nothing was written.
    Unchanged,
    Updated {
        /// Kind sent to the original author, if the editor was someone else.
        notified: Option<NotificationKind>,
    },
}

/// One page of a topic's replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyPage {
    pub per: u32,
    pub page: u32,
    pub total: u32,
    pub list: Vec<Reply>,
}

/// Reply workflow over a forum store and a refresh publisher.
pub struct ReplyWorkflow<S, P> {
    store: S,
    refresh: P,
}

impl<S, P> ReplyWorkflow<S, P>
where
    S: ForumStore + Clone,
    P: RefreshPublisher,
{
    pub fn new(store: S, refresh: P) -> Self {
        Self { store, refresh }
    }

    /// Publisher that receives this workflow's refresh signals.
    pub fn publisher(&self) -> &P {
        &self.refresh
    }

    /// Posts a reply as `ctx.user`.
    ///
    /// # Errors
    /// - `InvalidRequest` for a nil topic id or blank content.
    /// - `TopicNotFound` when the topic does not resolve; nothing is written.
    /// - Any store failure aborts the remaining steps.
    pub fn create_reply(
        &self,
        ctx: &RequestContext,
        request: &NewReplyRequest,
    ) -> Result<CreateReplyOutcome, WorkflowError> {
        let result = self.run_create(ctx, request);
        match &result {
            Ok(outcome) => info!(
                "event=reply_create module=reply status=ok reply={} topic={} user={} notified={} reward={}",
                outcome.reply.id,
                outcome.reply.topic,
                ctx.user.id,
                outcome.notified.len(),
                outcome.reward.unwrap_or(0)
            ),
            Err(err) => warn!(
                "event=reply_create module=reply status=error topic={} user={} error={err}",
                request.topic, ctx.user.id
            ),
        }
        result
    }

    fn run_create(
        &self,
        ctx: &RequestContext,
        request: &NewReplyRequest,
    ) -> Result<CreateReplyOutcome, WorkflowError> {
        if request.topic.is_nil() {
            return Err(WorkflowError::InvalidRequest("topic id must not be empty"));
        }
        let content = request.content.trim();
        if content.is_empty() {
            return Err(WorkflowError::InvalidRequest("reply content must not be empty"));
        }

        let user = &ctx.user;
        let topic = self.load_topic(request.topic)?;

        let reply = Reply::new(topic.id, user.id, content);
        self.store.create_reply(&reply)?;
        self.store
            .update_last_reply(topic.id, user.name.as_str(), reply.created_at)?;

        let notices = NotificationService::new(self.store.clone());
        let mut notified = Vec::new();
        if user.id != topic.author {
            notices.create(
                topic.author,
                NotificationPayload::NewReply(topic_event(user.name.as_str(), &topic)),
            )?;
            notified.push(topic.author);
        }

        let mentioned = MentionScanner::new(self.store.clone())
            .resolve_recipients(reply.content.as_str(), user.name.as_str())?;
        for recipient in mentioned {
            notices.create(
                recipient.id,
                NotificationPayload::Mention(topic_event(user.name.as_str(), &topic)),
            )?;
            notified.push(recipient.id);
        }

        let reward = RewardLedger::new(self.store.clone())
            .credit_for_reply(user.id, topic.title.as_str(), ctx.reward.new_reply)?
            .map(|bill| bill.amount);

        self.refresh.notify_refresh(RefreshSignal::REPLY_LIST);
        self.refresh.notify_refresh(RefreshSignal::NOTICE_LIST);

        Ok(CreateReplyOutcome {
            reply,
            notified,
            reward,
        })
    }

    /// Replaces a reply's content as `ctx.user`.
    ///
    /// Content is trimmed first; an unchanged body returns
    /// `EditReplyOutcome::Unchanged` without writes or signals. An empty body
    /// marks the reply removed.
    pub fn edit_reply(
        &self,
        ctx: &RequestContext,
        request: &EditReplyRequest,
    ) -> Result<EditReplyOutcome, WorkflowError> {
        let result = self.run_edit(ctx, request);
        match &result {
            Ok(EditReplyOutcome::Unchanged) => info!(
                "event=reply_edit module=reply status=skip reply={} reason=unchanged",
                request.reply
            ),
            Ok(EditReplyOutcome::Updated { notified }) => info!(
                "event=reply_edit module=reply status=ok reply={} user={} notice_kind={}",
                request.reply,
                ctx.user.id,
                notified.map_or(0, NotificationKind::code)
            ),
            Err(err) => warn!(
                "event=reply_edit module=reply status=error reply={} user={} error={err}",
                request.reply, ctx.user.id
            ),
        }
        result
    }

    fn run_edit(
        &self,
        ctx: &RequestContext,
        request: &EditReplyRequest,
    ) -> Result<EditReplyOutcome, WorkflowError> {
        if request.reply.is_nil() {
            return Err(WorkflowError::InvalidRequest("reply id must not be empty"));
        }

        let previous = self
            .store
            .get_reply(request.reply)?
            .ok_or(WorkflowError::ReplyNotFound(request.reply))?;

        let content = request.content.trim();
        if content == previous.content {
            return Ok(EditReplyOutcome::Unchanged);
        }

        self.store.update_reply_content(previous.id, content)?;

        let mut notified = None;
        if previous.author != ctx.user.id {
            let kind = if content.is_empty() {
                NotificationKind::ReplyRemoved
            } else {
                NotificationKind::ReplyEdited
            };
            let topic = self.load_topic(previous.topic)?;
            let event = ReplyEvent {
                actor: ctx.user.name.clone(),
                topic_id: previous.topic,
                topic_title: topic.title,
                reply_id: previous.id,
            };
            let payload = match kind {
                NotificationKind::ReplyRemoved => NotificationPayload::ReplyRemoved(event),
                _ => NotificationPayload::ReplyEdited(event),
            };
            NotificationService::new(self.store.clone()).create(previous.author, payload)?;
            self.refresh.notify_refresh(RefreshSignal::NOTICE_LIST);
            notified = Some(kind);
        }

        self.refresh.notify_refresh(RefreshSignal::REPLY_LIST);
        Ok(EditReplyOutcome::Updated { notified })
    }

    /// Returns one page of replies under `topic`.
    ///
    /// `page` is 1-based; `LAST_PAGE` (-1) resolves to the last page, or to
    /// page 1 when the topic has no replies.
    pub fn list_replies(&self, topic: TopicId, page: i64) -> Result<ReplyPage, WorkflowError> {
        if topic.is_nil() {
            return Err(WorkflowError::InvalidRequest("topic id must not be empty"));
        }
        if page != LAST_PAGE && page < 1 {
            return Err(WorkflowError::InvalidRequest(
                "page must be a positive number or -1",
            ));
        }

        let count = self.store.count_replies(topic)?;
        let total = u32::try_from(count.div_ceil(u64::from(REPLIES_PER_PAGE)))
            .map_err(|_| WorkflowError::InvalidRequest("reply count out of range"))?;
        let page = if page == LAST_PAGE {
            total.max(1)
        } else {
            u32::try_from(page).map_err(|_| WorkflowError::InvalidRequest("page out of range"))?
        };

        let list = self.store.paginate_replies(topic, page, REPLIES_PER_PAGE)?;
        Ok(ReplyPage {
            per: REPLIES_PER_PAGE,
            page,
            total,
            list,
        })
    }

    fn load_topic(&self, id: TopicId) -> Result<Topic, WorkflowError> {
        self.store
            .get_topic(id)?
            .ok_or(WorkflowError::TopicNotFound(id))
    }
}

fn topic_event(actor: &str, topic: &Topic) -> TopicEvent {
    TopicEvent {
        actor: actor.to_string(),
        topic_id: topic.id,
        topic_title: topic.title.clone(),
    }
}
