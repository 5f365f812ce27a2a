use chrono::{DateTime, Utc};
use folio_common::{
    AccessCategory, ContentId, PublicationId, Role, SubmissionId,
    SubmissionStatus, SubmissionTitle, UserId,
};
use itertools::Itertools;
use serde::Serialize;

use crate::domain::{
    DomainError, RoleAssignment,
    access::{self, SubmissionAccess},
    notifications::{StatusChanged, StatusNotifier},
    repository::{PublicationRepository, SubmissionRepository, UserRepository},
    users::{User, create_staged_user},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub title: String,
    pub publication_id: PublicationId,
    pub status: SubmissionStatus,
    pub status_change_comment: Option<String>,
    pub content_id: Option<ContentId>,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub title: SubmissionTitle,
    pub publication_id: PublicationId,
    pub created_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionContent {
    pub id: ContentId,
    pub submission_id: SubmissionId,
    pub data: String,
    pub created_at: DateTime<Utc>,
}

/// One role a user holds on a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSubmission {
    pub submission_id: SubmissionId,
    pub title: String,
    pub publication_id: PublicationId,
    pub status: SubmissionStatus,
    pub role: Role,
}

/// A submission as seen by one user.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetails {
    #[serde(flatten)]
    pub submission: Submission,
    pub status_name: &'static str,
    pub my_role: Option<Role>,
    pub effective_role: Option<Role>,
}

impl From<SubmissionAccess> for SubmissionDetails {
    fn from(access: SubmissionAccess) -> Self {
        Self {
            status_name: access.submission.status.name(),
            my_role: access.my_role,
            effective_role: access.effective_role,
            submission: access.submission,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub title: String,
    pub publication_id: PublicationId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserConnections {
    pub connect: Vec<UserId>,
    pub disconnect: Vec<UserId>,
}

impl UserConnections {
    fn is_empty(&self) -> bool {
        self.connect.is_empty() && self.disconnect.is_empty()
    }
}

/// Pivot rows written together with a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub attach: Vec<(UserId, Role)>,
    pub detach: Vec<(UserId, Role)>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSubmission {
    pub title: Option<String>,
    pub status: Option<SubmissionStatus>,
    pub status_change_comment: Option<String>,
    pub reviewers: Option<UserConnections>,
    pub review_coordinators: Option<UserConnections>,
    pub submitters: Option<UserConnections>,
}

impl UpdateSubmission {
    fn connections(&self) -> impl Iterator<Item = (Role, &UserConnections)> {
        [
            (Role::Reviewer, &self.reviewers),
            (Role::ReviewCoordinator, &self.review_coordinators),
            (Role::Submitter, &self.submitters),
        ]
        .into_iter()
        .filter_map(|(role, connections)| connections.as_ref().map(|c| (role, c)))
        .filter(|(_, connections)| !connections.is_empty())
    }
}

pub async fn create_submission<R>(
    repository: &R,
    actor: &User,
    input: CreateSubmission,
) -> Result<Submission, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let title = SubmissionTitle::try_new(input.title).map_err(DomainError::validation)?;
    let publication = repository
        .find_publication(input.publication_id)
        .await?
        .ok_or(DomainError::NotFound("publication"))?;
    if !publication.is_accepting_submissions {
        return Err(DomainError::validation(
            "the publication is not accepting submissions",
        ));
    }

    let submission = repository
        .insert_submission(NewSubmission {
            title,
            publication_id: publication.id,
            created_by: actor.id,
        })
        .await?;
    tracing::info!(submission_id = %submission.id, user_id = %actor.id, "submission created");
    Ok(submission)
}

pub async fn find_submission<R>(
    repository: &R,
    actor: &User,
    id: SubmissionId,
) -> Result<SubmissionDetails, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    Ok(access::authorize_read(repository, actor, id).await?.into())
}

/// Submissions the user holds a direct role on, one entry per role.
pub async fn submissions_for_user(
    repository: &impl SubmissionRepository,
    user_id: UserId,
) -> Result<Vec<UserSubmission>, DomainError> {
    Ok(repository.submissions_for_user(user_id).await?)
}

fn check_submitter_update(access: &SubmissionAccess, input: &UpdateSubmission) -> Result<(), DomainError> {
    if input.connections().next().is_some() {
        return Err(DomainError::Forbidden);
    }
    match input.status {
        None => Ok(()),
        Some(status) if status == access.submission.status => Ok(()),
        Some(SubmissionStatus::InitiallySubmitted)
            if access.submission.status == SubmissionStatus::Draft =>
        {
            Ok(())
        }
        Some(_) => Err(DomainError::Forbidden),
    }
}

/// Applies `input` to the submission `id`.
///
/// Review coordinators and application administrators may change anything.
/// Submitters may retitle and hand in a draft.
pub async fn update_submission<R, N>(
    repository: &R,
    notifier: &N,
    actor: &User,
    id: SubmissionId,
    input: UpdateSubmission,
) -> Result<SubmissionDetails, DomainError>
where
    R: PublicationRepository + SubmissionRepository + UserRepository,
    N: StatusNotifier,
{
    let access = access::load(repository, actor, id).await?;
    if !access.can_manage() {
        if access.effective_role != Some(Role::Submitter) {
            return Err(DomainError::Forbidden);
        }
        check_submitter_update(&access, &input)?;
    }

    let mut submission = access.submission.clone();
    let previous = submission.status;

    if let Some(title) = &input.title {
        submission.title = SubmissionTitle::try_new(title.clone())
            .map_err(DomainError::validation)?
            .into_inner();
    }
    let status_changed = match input.status {
        Some(status) if status != previous => {
            submission.status = status;
            true
        }
        _ => false,
    };
    if status_changed || input.status_change_comment.is_some() {
        submission.status_change_comment = input.status_change_comment.clone();
    }
    submission.updated_by = actor.id;

    let changes = plan_role_changes(repository, id, input.connections()).await?;
    let submission = repository.update_submission(&submission, &changes).await?;

    if status_changed {
        tracing::info!(submission_id = %id, from = %previous, to = %submission.status, "status changed");
        notifier.status_changed(StatusChanged {
            submission_id: id,
            from: previous,
            to: submission.status,
            comment: submission.status_change_comment.clone(),
            actor: actor.id,
        });
    }

    Ok(access::resolve(repository, actor, submission).await?.into())
}

// every connected user is checked before anything is written
async fn plan_role_changes<'a, R>(
    repository: &R,
    id: SubmissionId,
    connections: impl Iterator<Item = (Role, &'a UserConnections)>,
) -> Result<RoleChanges, DomainError>
where
    R: SubmissionRepository + UserRepository,
{
    let existing = repository.submission_users(id).await?;
    let mut changes = RoleChanges::default();

    for (role, connections) in connections {
        for user_id in connections.connect.iter().unique() {
            let attached = existing.iter().any(|a| a.user_id == *user_id && a.role == role);
            if attached || connections.disconnect.contains(user_id) {
                continue;
            }
            repository
                .find_user(*user_id)
                .await?
                .ok_or(DomainError::NotFound("user"))?;
            changes.attach.push((*user_id, role));
        }
        changes
            .detach
            .extend(connections.disconnect.iter().map(|user_id| (*user_id, role)));
    }
    Ok(changes)
}

/// Invites someone by email in `role`, creating a staged account when
/// nobody uses that address yet.
pub async fn stage_user<R>(
    repository: &R,
    actor: &User,
    id: SubmissionId,
    email: &str,
    role: Role,
) -> Result<User, DomainError>
where
    R: PublicationRepository + SubmissionRepository + UserRepository,
{
    if !matches!(role, Role::Reviewer | Role::ReviewCoordinator) {
        return Err(DomainError::Validation(format!("{} cannot be staged", role)));
    }
    access::authorize_manage(repository, actor, id).await?;

    let user = create_staged_user(repository, email).await?;
    let attached = repository
        .submission_users(id)
        .await?
        .iter()
        .any(|a| a.user_id == user.id && a.role == role);
    if !attached {
        repository.attach_submission_user(id, user.id, role).await?;
    }
    tracing::info!(submission_id = %id, user_id = %user.id, %role, "user staged");
    Ok(user)
}

pub async fn submission_users<R>(
    repository: &R,
    actor: &User,
    id: SubmissionId,
) -> Result<Vec<RoleAssignment>, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    access::authorize_read(repository, actor, id).await?;
    Ok(repository.submission_users(id).await?)
}

/// Stores a new content version. Drafts are edited by their submitters,
/// coordinators may replace the content at any time.
pub async fn append_content<R>(
    repository: &R,
    actor: &User,
    id: SubmissionId,
    data: String,
) -> Result<SubmissionContent, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let access = access::load(repository, actor, id).await?;
    if !access.can_manage() {
        access.require(AccessCategory::Draft)?;
    }
    Ok(repository.append_content(id, data).await?)
}

pub async fn content_history<R>(
    repository: &R,
    actor: &User,
    id: SubmissionId,
) -> Result<Vec<SubmissionContent>, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    access::authorize_read(repository, actor, id).await?;
    Ok(repository.content_history(id).await?)
}
