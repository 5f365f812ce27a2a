//! Access policy for submissions.
//!
//! Every decision about who may open which submission page goes through
//! [`evaluate`], both when the API authorizes a request and when navigation
//! guards decide where a user may go.

use serde::Serialize;

use crate::domain::{Role, SubmissionId, SubmissionStatus};

/// Path every denied navigation ends on.
pub const FORBIDDEN_PATH: &str = "/error403";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessCategory {
    Draft,
    Preview,
    View,
    Review,
    Export,
}

impl AccessCategory {
    pub const ALL: [AccessCategory; 5] = [
        Self::Draft,
        Self::Preview,
        Self::View,
        Self::Review,
        Self::Export,
    ];

    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Preview => "preview",
            Self::View => "view",
            Self::Review => "review",
            Self::Export => "export",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.path_segment() == segment)
    }

    /// Submission roles that may open pages of this category.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::Draft => &[Role::Submitter],
            Self::Preview => &[Role::Submitter, Role::ReviewCoordinator],
            Self::View => &[Role::Submitter, Role::Reviewer, Role::ReviewCoordinator],
            Self::Review => &[Role::Reviewer, Role::ReviewCoordinator],
            Self::Export => &[Role::Submitter, Role::ReviewCoordinator],
        }
    }

    /// Whether publication administrators and editors reach this category
    /// through their publication role when the submission is not one of
    /// their own.
    pub fn admits_publication_staff(self) -> bool {
        matches!(self, Self::Preview | Self::View | Self::Export)
    }

    fn allows(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// A submission page a user can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteTarget {
    pub category: AccessCategory,
    pub submission_id: SubmissionId,
}

impl RouteTarget {
    pub fn path(&self) -> String {
        format!(
            "/submission/{}/{}",
            self.submission_id,
            self.category.path_segment()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Redirect(RouteTarget),
    Deny,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Everything the policy needs to know about a user and a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessContext {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub effective_role: Option<Role>,
    pub is_application_admin: bool,
}

/// Folds publication level roles into the role a user holds on a submission.
///
/// Any role on the owning publication makes the user a review coordinator of
/// every submission in it, even when a direct submission role exists.
/// Otherwise the first direct assignment wins.
pub fn effective_submission_role(
    publication_role: Option<Role>,
    direct_roles: &[Role],
) -> Option<Role> {
    if publication_role.is_some() {
        return Some(Role::ReviewCoordinator);
    }
    direct_roles.first().copied()
}

/// Whether the user may change a submission beyond what its submitter can.
pub fn can_manage(effective_role: Option<Role>, is_application_admin: bool) -> bool {
    is_application_admin || effective_role == Some(Role::ReviewCoordinator)
}

pub fn evaluate(category: AccessCategory, context: &AccessContext) -> AccessDecision {
    if context.is_application_admin {
        return AccessDecision::Allow;
    }

    let Some(role) = context.effective_role else {
        return AccessDecision::Deny;
    };

    let is_draft = context.status == SubmissionStatus::Draft;
    match category {
        AccessCategory::Draft | AccessCategory::Preview if !is_draft => {
            return redirect_to(AccessCategory::View, context);
        }
        AccessCategory::View | AccessCategory::Review | AccessCategory::Export if is_draft => {
            return redirect_to(AccessCategory::Preview, context);
        }
        AccessCategory::Review if role == Role::Submitter => {
            return redirect_to(AccessCategory::View, context);
        }
        _ => {}
    }

    if !category.allows(role) {
        return AccessDecision::Deny;
    }

    if role == Role::Reviewer
        && matches!(category, AccessCategory::View | AccessCategory::Review)
        && !context.status.is_reviewable()
    {
        return AccessDecision::Deny;
    }

    AccessDecision::Allow
}

// the redirect target is only offered when the user can actually open it
fn redirect_to(category: AccessCategory, context: &AccessContext) -> AccessDecision {
    match evaluate(category, context) {
        AccessDecision::Allow => AccessDecision::Redirect(RouteTarget {
            category,
            submission_id: context.submission_id,
        }),
        _ => AccessDecision::Deny,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(status: SubmissionStatus, role: Option<Role>) -> AccessContext {
        AccessContext {
            submission_id: SubmissionId(7),
            status,
            effective_role: role,
            is_application_admin: false,
        }
    }

    fn redirect(category: AccessCategory) -> AccessDecision {
        AccessDecision::Redirect(RouteTarget {
            category,
            submission_id: SubmissionId(7),
        })
    }

    #[test]
    fn publication_role_overrides_direct_role() {
        assert_eq!(
            effective_submission_role(Some(Role::Editor), &[Role::Reviewer]),
            Some(Role::ReviewCoordinator)
        );
        assert_eq!(
            effective_submission_role(Some(Role::PublicationAdministrator), &[]),
            Some(Role::ReviewCoordinator)
        );
    }

    #[test]
    fn falls_back_to_first_direct_role() {
        assert_eq!(
            effective_submission_role(None, &[Role::Submitter, Role::Reviewer]),
            Some(Role::Submitter)
        );
        assert_eq!(effective_submission_role(None, &[]), None);
    }

    #[test]
    fn submitter_viewing_draft_goes_to_preview() {
        let ctx = context(SubmissionStatus::Draft, Some(Role::Submitter));
        assert_eq!(evaluate(AccessCategory::View, &ctx), redirect(AccessCategory::Preview));
        assert_eq!(evaluate(AccessCategory::Preview, &ctx), AccessDecision::Allow);
        assert_eq!(evaluate(AccessCategory::Draft, &ctx), AccessDecision::Allow);
    }

    #[test]
    fn preview_of_submitted_work_goes_to_view() {
        let ctx = context(SubmissionStatus::UnderReview, Some(Role::Submitter));
        assert_eq!(evaluate(AccessCategory::Preview, &ctx), redirect(AccessCategory::View));
        assert_eq!(evaluate(AccessCategory::Draft, &ctx), redirect(AccessCategory::View));
    }

    #[test]
    fn submitter_is_sent_from_review_to_view() {
        let ctx = context(SubmissionStatus::UnderReview, Some(Role::Submitter));
        assert_eq!(evaluate(AccessCategory::Review, &ctx), redirect(AccessCategory::View));
    }

    #[test]
    fn reviewer_denied_on_nonreviewable_status() {
        for status in [SubmissionStatus::Rejected, SubmissionStatus::ResubmissionRequested] {
            let ctx = context(status, Some(Role::Reviewer));
            assert_eq!(evaluate(AccessCategory::View, &ctx), AccessDecision::Deny);
            assert_eq!(evaluate(AccessCategory::Review, &ctx), AccessDecision::Deny);
        }
        let ctx = context(SubmissionStatus::UnderReview, Some(Role::Reviewer));
        assert_eq!(evaluate(AccessCategory::Review, &ctx), AccessDecision::Allow);
        assert_eq!(evaluate(AccessCategory::Export, &ctx), AccessDecision::Deny);
    }

    #[test]
    fn reviewer_is_not_redirected_into_a_draft() {
        let ctx = context(SubmissionStatus::Draft, Some(Role::Reviewer));
        assert_eq!(evaluate(AccessCategory::View, &ctx), AccessDecision::Deny);
    }

    #[test]
    fn coordinator_cannot_edit_the_draft() {
        let ctx = context(SubmissionStatus::Draft, Some(Role::ReviewCoordinator));
        assert_eq!(evaluate(AccessCategory::Draft, &ctx), AccessDecision::Deny);
        assert_eq!(evaluate(AccessCategory::Preview, &ctx), AccessDecision::Allow);
    }

    #[test]
    fn no_role_is_denied() {
        let ctx = context(SubmissionStatus::UnderReview, None);
        for category in AccessCategory::ALL {
            assert_eq!(evaluate(category, &ctx), AccessDecision::Deny);
        }
    }

    #[test]
    fn application_admin_is_always_allowed() {
        let ctx = AccessContext {
            is_application_admin: true,
            ..context(SubmissionStatus::Rejected, None)
        };
        for category in AccessCategory::ALL {
            assert_eq!(evaluate(category, &ctx), AccessDecision::Allow);
        }
    }

    #[test]
    fn route_target_path() {
        let target = RouteTarget {
            category: AccessCategory::Export,
            submission_id: SubmissionId(12),
        };
        assert_eq!(target.path(), "/submission/12/export");
        assert_eq!(AccessCategory::from_path_segment("review"), Some(AccessCategory::Review));
    }
}
