//! Notification use-case service.
//!
//! # Responsibility
//! - Create one notification per event and recipient.
//! - Serve unread lists and read-flag updates.
//!
//! # Invariants
//! - A nil id or recipient is rejected before touching storage.
//! - Unread lists never contain read notifications.
//! - `mark_read` does not check that the caller owns the notification.

use crate::model::notification::{
    Notification, NotificationId, NotificationPayload, UnreadNotification,
};
use crate::model::user::UserId;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::store::RepoError;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NotificationError {
    /// Notification id was empty.
    MissingId,
    /// Recipient id was empty.
    MissingRecipient,
    NotFound(NotificationId),
    Repo(RepoError),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "notification id must not be empty"),
            Self::MissingRecipient => write!(f, "notification recipient must not be empty"),
            Self::NotFound(id) => write!(f, "notification not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotificationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotificationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "notification",
                id,
            } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl NotificationError {
    /// Whether the caller sent an unusable request (vs. a store failure).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingId | Self::MissingRecipient)
    }
}

pub struct NotificationService<R: NotificationRepository> {
    repo: R,
}

impl<R: NotificationRepository> NotificationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores an unread notification for `recipient`.
    ///
    /// Storage errors propagate unchanged; nothing is retried.
    pub fn create(
        &self,
        recipient: UserId,
        payload: NotificationPayload,
    ) -> Result<Notification, NotificationError> {
        if recipient.is_nil() {
            return Err(NotificationError::MissingRecipient);
        }
        let notification = Notification::new(recipient, payload);
        self.repo.insert_notification(&notification)?;
        debug!(
            "event=notice_create module=notification status=ok id={} kind={} recipient={}",
            notification.id,
            notification.payload.code(),
            recipient
        );
        Ok(notification)
    }

    pub fn find(&self, id: NotificationId) -> Result<Notification, NotificationError> {
        if id.is_nil() {
            return Err(NotificationError::MissingId);
        }
        self.repo
            .get_notification(id)?
            .ok_or(NotificationError::NotFound(id))
    }

    /// Lists unread notifications for `recipient` in store order.
    pub fn list_unread(
        &self,
        recipient: UserId,
    ) -> Result<Vec<UnreadNotification>, NotificationError> {
        if recipient.is_nil() {
            return Err(NotificationError::MissingRecipient);
        }
        Ok(self.repo.list_unread_notifications(recipient)?)
    }

    /// Sets the read flag unconditionally.
    ///
    /// The recipient is not compared against the caller.
    pub fn mark_read(&self, id: NotificationId, read: bool) -> Result<(), NotificationError> {
        if id.is_nil() {
            return Err(NotificationError::MissingId);
        }
        self.repo.set_notification_read(id, read)?;
        Ok(())
    }
}
