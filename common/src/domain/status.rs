use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a submission.
///
/// The discriminants are persisted and relied upon by clients, renumbering any
/// of them is a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum SubmissionStatus {
    Draft = 0,
    InitiallySubmitted = 1,
    ResubmissionRequested = 2,
    Resubmitted = 3,
    AwaitingReview = 4,
    Rejected = 5,
    AcceptedAsFinal = 6,
    Expired = 7,
    UnderReview = 8,
    AwaitingDecision = 9,
    RevisionRequested = 10,
    Archived = 11,
    Deleted = 12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown submission status code {0}")]
pub struct UnknownStatus(pub i32);

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 13] = [
        Self::Draft,
        Self::InitiallySubmitted,
        Self::ResubmissionRequested,
        Self::Resubmitted,
        Self::AwaitingReview,
        Self::Rejected,
        Self::AcceptedAsFinal,
        Self::Expired,
        Self::UnderReview,
        Self::AwaitingDecision,
        Self::RevisionRequested,
        Self::Archived,
        Self::Deleted,
    ];

    /// Statuses in which reviewers may neither view nor review a submission.
    pub const NONREVIEWABLE: [SubmissionStatus; 7] = [
        Self::Draft,
        Self::InitiallySubmitted,
        Self::ResubmissionRequested,
        Self::Rejected,
        Self::Expired,
        Self::Archived,
        Self::Deleted,
    ];

    pub fn code(self) -> i16 {
        self as i16
    }

    /// Display label of the status.
    pub fn name(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::InitiallySubmitted => "INITIALLY_SUBMITTED",
            Self::ResubmissionRequested => "RESUBMISSION_REQUESTED",
            Self::Resubmitted => "RESUBMITTED",
            Self::AwaitingReview => "AWAITING_REVIEW",
            Self::Rejected => "REJECTED",
            Self::AcceptedAsFinal => "ACCEPTED_AS_FINAL",
            Self::Expired => "EXPIRED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::AwaitingDecision => "AWAITING_DECISION",
            Self::RevisionRequested => "REVISION_REQUESTED",
            Self::Archived => "ARCHIVED",
            Self::Deleted => "DELETED",
        }
    }

    pub fn is_reviewable(self) -> bool {
        !Self::NONREVIEWABLE.contains(&self)
    }
}

impl TryFrom<i32> for SubmissionStatus {
    type Error = UnknownStatus;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| i32::from(status.code()) == code)
            .ok_or(UnknownStatus(code))
    }
}

impl TryFrom<i16> for SubmissionStatus {
    type Error = UnknownStatus;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Self::try_from(i32::from(code))
    }
}

impl From<SubmissionStatus> for i16 {
    fn from(value: SubmissionStatus) -> Self {
        value.code()
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_status_has_a_distinct_label() {
        let labels: HashSet<&str> = SubmissionStatus::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(labels.len(), SubmissionStatus::ALL.len());
        assert!(labels.iter().all(|label| !label.is_empty()));
    }

    #[test]
    fn codes_are_stable() {
        for (expected, status) in SubmissionStatus::ALL.iter().enumerate() {
            assert_eq!(status.code() as usize, expected);
            assert_eq!(SubmissionStatus::try_from(expected as i32), Ok(*status));
        }
        assert_eq!(SubmissionStatus::AcceptedAsFinal.code(), 6);
        assert_eq!(SubmissionStatus::Deleted.name(), "DELETED");
    }

    #[test]
    fn undefined_codes_are_rejected() {
        assert_eq!(SubmissionStatus::try_from(13i32), Err(UnknownStatus(13)));
        assert_eq!(SubmissionStatus::try_from(-1i32), Err(UnknownStatus(-1)));
        assert!(serde_json::from_str::<SubmissionStatus>("42").is_err());
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&SubmissionStatus::UnderReview).unwrap();
        assert_eq!(json, "8");
        let status: SubmissionStatus = serde_json::from_str("2").unwrap();
        assert_eq!(status, SubmissionStatus::ResubmissionRequested);
    }

    #[test]
    fn rejected_is_not_reviewable() {
        assert!(!SubmissionStatus::Rejected.is_reviewable());
        assert!(!SubmissionStatus::ResubmissionRequested.is_reviewable());
        assert!(SubmissionStatus::UnderReview.is_reviewable());
    }
}
