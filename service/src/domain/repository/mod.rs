use std::future::Future;

use folio_common::{
    CommentId, Email, NotificationId, PublicationId, Role, StyleCriteriaId, SubmissionId, UserId,
};
use thiserror::Error;

use crate::domain::{
    RoleAssignment,
    comments::{Comment, NewComment},
    notifications::{NewNotification, Notification},
    publications::{NewPublication, NewStyleCriteria, Publication, StyleCriteria},
    submissions::{NewSubmission, RoleChanges, Submission, SubmissionContent, UserSubmission},
    users::{NewUser, User},
};

pub trait UserRepository: Send + Sync + 'static {
    fn find_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn find_user_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    fn username_exists(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// Insert a user, unique violation on duplicate email or username
    fn insert_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Persist every mutable field of `user`
    fn update_user(&self, user: &User) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    fn assign_global_role(
        &self,
        user_id: UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

pub trait SessionRepository: Send + Sync + 'static {
    fn create_session(
        &self,
        token: &str,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn find_session_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<UserId>, RepositoryError>> + Send;

    fn delete_session(&self, token: &str) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

pub trait PublicationRepository: Send + Sync + 'static {
    fn insert_publication(
        &self,
        publication: NewPublication,
    ) -> impl Future<Output = Result<Publication, RepositoryError>> + Send;

    fn find_publication(
        &self,
        id: PublicationId,
    ) -> impl Future<Output = Result<Option<Publication>, RepositoryError>> + Send;

    fn list_publications(
        &self,
        only_publicly_visible: bool,
    ) -> impl Future<Output = Result<Vec<Publication>, RepositoryError>> + Send;

    /// Roles of one user on a publication, oldest assignment first
    fn publication_roles(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Role>, RepositoryError>> + Send;

    fn publication_users(
        &self,
        publication_id: PublicationId,
    ) -> impl Future<Output = Result<Vec<RoleAssignment>, RepositoryError>> + Send;

    fn attach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Returns whether an assignment was removed
    fn detach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn style_criteria(
        &self,
        publication_id: PublicationId,
    ) -> impl Future<Output = Result<Vec<StyleCriteria>, RepositoryError>> + Send;

    fn find_style_criteria(
        &self,
        id: StyleCriteriaId,
    ) -> impl Future<Output = Result<Option<StyleCriteria>, RepositoryError>> + Send;

    fn insert_style_criteria(
        &self,
        criteria: NewStyleCriteria,
    ) -> impl Future<Output = Result<StyleCriteria, RepositoryError>> + Send;

    fn update_style_criteria(
        &self,
        criteria: &StyleCriteria,
    ) -> impl Future<Output = Result<StyleCriteria, RepositoryError>> + Send;

    fn delete_style_criteria(
        &self,
        id: StyleCriteriaId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

pub trait SubmissionRepository: Send + Sync + 'static {
    /// Insert a submission and attach its creator as submitter
    fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> impl Future<Output = Result<Submission, RepositoryError>> + Send;

    fn find_submission(
        &self,
        id: SubmissionId,
    ) -> impl Future<Output = Result<Option<Submission>, RepositoryError>> + Send;

    /// Persist title, status, status comment and updater together with `changes`.
    /// Either everything is written or nothing is. The content pointer is left alone.
    fn update_submission(
        &self,
        submission: &Submission,
        changes: &RoleChanges,
    ) -> impl Future<Output = Result<Submission, RepositoryError>> + Send;

    /// Every pivot row of a submission, oldest first
    fn submission_users(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<Vec<RoleAssignment>, RepositoryError>> + Send;

    fn attach_submission_user(
        &self,
        submission_id: SubmissionId,
        user_id: UserId,
        role: Role,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// One entry per pivot row of the user
    fn submissions_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<UserSubmission>, RepositoryError>> + Send;

    /// Append a content version and point the submission at it
    fn append_content(
        &self,
        submission_id: SubmissionId,
        data: String,
    ) -> impl Future<Output = Result<SubmissionContent, RepositoryError>> + Send;

    /// Content versions, oldest first
    fn content_history(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<Vec<SubmissionContent>, RepositoryError>> + Send;
}

pub trait CommentRepository: Send + Sync + 'static {
    fn insert_comment(
        &self,
        comment: NewComment,
    ) -> impl Future<Output = Result<Comment, RepositoryError>> + Send;

    fn find_comment(
        &self,
        id: CommentId,
    ) -> impl Future<Output = Result<Option<Comment>, RepositoryError>> + Send;

    /// Comments that are not soft deleted, in creation order
    fn comments_for_submission(
        &self,
        submission_id: SubmissionId,
    ) -> impl Future<Output = Result<Vec<Comment>, RepositoryError>> + Send;

    fn soft_delete_comment(
        &self,
        id: CommentId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

pub trait NotificationRepository: Send + Sync + 'static {
    fn insert_notification(
        &self,
        notification: NewNotification,
    ) -> impl Future<Output = Result<Notification, RepositoryError>> + Send;

    /// Newest first
    fn notifications_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Notification>, RepositoryError>> + Send;

    /// Returns whether a notification of this user was changed
    fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn mark_all_notifications_read(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Every persistence concern of the service behind one handle.
pub trait Repository:
    UserRepository
    + SessionRepository
    + PublicationRepository
    + SubmissionRepository
    + CommentRepository
    + NotificationRepository
    + Clone
{
}

impl<T> Repository for T where
    T: UserRepository
        + SessionRepository
        + PublicationRepository
        + SubmissionRepository
        + CommentRepository
        + NotificationRepository
        + Clone
{
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}
