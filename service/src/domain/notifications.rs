use chrono::{DateTime, Utc};
use folio_common::{NotificationId, SubmissionId, SubmissionStatus, UserId};
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::domain::{
    DomainError,
    repository::{NotificationRepository, SubmissionRepository, UserRepository},
};

pub const SUBMISSION_STATUS_CHANGED: &str = "submission_status_changed";

/// Emitted after the status of a submission was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChanged {
    pub submission_id: SubmissionId,
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
    pub comment: Option<String>,
    pub actor: UserId,
}

pub trait StatusNotifier: Clone + Send + Sync + 'static {
    fn status_changed(&self, event: StatusChanged);
}

pub const NOTIFICATION_QUEUE_CAPACITY: usize = 1024;

/// Hands status changes to the dispatcher task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<StatusChanged>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::Receiver<StatusChanged>) {
        Self::with_capacity(NOTIFICATION_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<StatusChanged>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

impl StatusNotifier for ChannelNotifier {
    /// Never waits. Events that do not fit the queue are dropped with a warning.
    fn status_changed(&self, event: StatusChanged) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => tracing::warn!(
                submission_id = %event.submission_id,
                to = %event.to,
                "notification queue is full, dropping status change"
            ),
            Err(TrySendError::Closed(event)) => tracing::warn!(
                submission_id = %event.submission_id,
                "notification dispatcher is gone"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: String,
    pub data: Value,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: String,
    pub data: Value,
}

/// Stores one notification for every user attached to the submission except
/// the one who changed it. Returns the number of notifications stored.
pub async fn deliver<R>(repository: &R, event: &StatusChanged) -> Result<usize, DomainError>
where
    R: SubmissionRepository + NotificationRepository + UserRepository,
{
    let title = repository
        .find_submission(event.submission_id)
        .await?
        .map(|s| s.title)
        .ok_or(DomainError::NotFound("submission"))?;
    let changed_by = repository
        .find_user(event.actor)
        .await?
        .map(|user| user.display_label().to_string());

    let recipients = repository
        .submission_users(event.submission_id)
        .await?
        .into_iter()
        .map(|assignment| assignment.user_id)
        .filter(|user_id| *user_id != event.actor)
        .unique()
        .collect_vec();

    for user_id in &recipients {
        let notification = NewNotification {
            user_id: *user_id,
            kind: SUBMISSION_STATUS_CHANGED.to_string(),
            data: json!({
                "submission_id": event.submission_id,
                "title": title,
                "from": event.from,
                "to": event.to,
                "to_name": event.to.name(),
                "comment": event.comment,
                "changed_by": changed_by,
            }),
        };
        repository.insert_notification(notification).await?;
    }
    Ok(recipients.len())
}

/// Drains `receiver` until every notifier is dropped.
pub fn spawn_dispatcher<R>(
    repository: R,
    mut receiver: mpsc::Receiver<StatusChanged>,
) -> JoinHandle<()>
where
    R: SubmissionRepository + NotificationRepository + UserRepository,
{
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match deliver(&repository, &event).await {
                Ok(count) => tracing::debug!(
                    submission_id = %event.submission_id,
                    from = %event.from,
                    to = %event.to,
                    count,
                    "status change delivered"
                ),
                Err(e) => tracing::error!(
                    submission_id = %event.submission_id,
                    "failed to deliver status change: {}",
                    e
                ),
            }
        }
        tracing::debug!("notification dispatcher stopped");
    })
}

pub async fn notifications_for_user(
    repository: &impl NotificationRepository,
    user_id: UserId,
) -> Result<Vec<Notification>, DomainError> {
    Ok(repository.notifications_for_user(user_id).await?)
}

pub async fn mark_notification_read(
    repository: &impl NotificationRepository,
    user_id: UserId,
    id: NotificationId,
) -> Result<(), DomainError> {
    if repository.mark_notification_read(user_id, id).await? {
        Ok(())
    } else {
        Err(DomainError::NotFound("notification"))
    }
}

pub async fn mark_all_notifications_read(
    repository: &impl NotificationRepository,
    user_id: UserId,
) -> Result<u64, DomainError> {
    Ok(repository.mark_all_notifications_read(user_id).await?)
}
