//! Resolves who a user is on a submission and asks the access policy about it.

use folio_common::{
    AccessCategory, AccessContext, AccessDecision, Role, SubmissionId,
    access::{can_manage, effective_submission_role, evaluate},
};
use itertools::Itertools;

use crate::domain::{
    DomainError,
    publications::publication_role,
    repository::{PublicationRepository, SubmissionRepository},
    submissions::Submission,
    users::User,
};

/// A submission together with the roles the current user holds on it.
#[derive(Debug, Clone)]
pub struct SubmissionAccess {
    pub submission: Submission,
    /// First direct role on the submission
    pub my_role: Option<Role>,
    pub effective_role: Option<Role>,
    pub context: AccessContext,
}

impl SubmissionAccess {
    pub fn decision(&self, category: AccessCategory) -> AccessDecision {
        evaluate(category, &self.context)
    }

    pub fn can_manage(&self) -> bool {
        can_manage(self.effective_role, self.context.is_application_admin)
    }

    /// Requires the policy to allow `category` outright.
    pub fn require(&self, category: AccessCategory) -> Result<(), DomainError> {
        match self.decision(category) {
            AccessDecision::Allow => Ok(()),
            decision => {
                tracing::debug!(submission_id = %self.submission.id, ?category, ?decision, "access denied");
                Err(DomainError::Forbidden)
            }
        }
    }
}

/// Direct roles of `user` on the submission, oldest assignment first.
pub async fn direct_roles(
    repository: &impl SubmissionRepository,
    submission_id: SubmissionId,
    user: &User,
) -> Result<Vec<Role>, DomainError> {
    Ok(repository
        .submission_users(submission_id)
        .await?
        .into_iter()
        .filter(|assignment| assignment.user_id == user.id)
        .sorted_by_key(|assignment| assignment.id)
        .map(|assignment| assignment.role)
        .collect())
}

pub async fn resolve<R>(
    repository: &R,
    user: &User,
    submission: Submission,
) -> Result<SubmissionAccess, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let direct = direct_roles(repository, submission.id, user).await?;
    let on_publication = publication_role(repository, submission.publication_id, user.id).await?;
    let effective_role = effective_submission_role(on_publication, &direct);

    let context = AccessContext {
        submission_id: submission.id,
        status: submission.status,
        effective_role,
        is_application_admin: user.is_application_admin(),
    };
    Ok(SubmissionAccess {
        submission,
        my_role: direct.first().copied(),
        effective_role,
        context,
    })
}

/// Loads the submission `id` and resolves the access of `user` to it.
///
/// Repository failures while resolving roles deny access.
pub async fn load<R>(repository: &R, user: &User, id: SubmissionId) -> Result<SubmissionAccess, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let submission = repository
        .find_submission(id)
        .await?
        .ok_or(DomainError::NotFound("submission"))?;

    resolve(repository, user, submission).await.map_err(|e| match e {
        DomainError::Repository(e) => {
            tracing::warn!(submission_id = %id, "access resolution failed: {}", e);
            DomainError::Forbidden
        }
        other => other,
    })
}

/// A submission is readable when its view page is reachable, directly or
/// through the page matching its status.
pub async fn authorize_read<R>(
    repository: &R,
    user: &User,
    id: SubmissionId,
) -> Result<SubmissionAccess, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let access = load(repository, user, id).await?;
    match access.decision(AccessCategory::View) {
        AccessDecision::Allow | AccessDecision::Redirect(_) => Ok(access),
        AccessDecision::Deny => {
            tracing::debug!(submission_id = %id, user_id = %user.id, "read denied");
            Err(DomainError::Forbidden)
        }
    }
}

/// Requires the user to be a review coordinator of the submission or an
/// application administrator.
pub async fn authorize_manage<R>(
    repository: &R,
    user: &User,
    id: SubmissionId,
) -> Result<SubmissionAccess, DomainError>
where
    R: PublicationRepository + SubmissionRepository,
{
    let access = load(repository, user, id).await?;
    if access.can_manage() {
        Ok(access)
    } else {
        Err(DomainError::Forbidden)
    }
}
