use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles a user can hold, globally or through a publication or submission
/// assignment. Ids are persisted in pivot rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum Role {
    ApplicationAdministrator = 1,
    PublicationAdministrator = 2,
    Editor = 3,
    ReviewCoordinator = 4,
    Reviewer = 5,
    Submitter = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown role id {0}")]
pub struct UnknownRole(pub i32);

impl Role {
    pub const ALL: [Role; 6] = [
        Self::ApplicationAdministrator,
        Self::PublicationAdministrator,
        Self::Editor,
        Self::ReviewCoordinator,
        Self::Reviewer,
        Self::Submitter,
    ];

    pub fn id(self) -> i16 {
        self as i16
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ApplicationAdministrator => "Application Administrator",
            Self::PublicationAdministrator => "Publication Administrator",
            Self::Editor => "Editor",
            Self::ReviewCoordinator => "Review Coordinator",
            Self::Reviewer => "Reviewer",
            Self::Submitter => "Submitter",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    /// Roles that can be assigned on a publication.
    pub fn is_publication_role(self) -> bool {
        matches!(self, Self::PublicationAdministrator | Self::Editor)
    }

    /// Roles that can be assigned on a submission.
    pub fn is_submission_role(self) -> bool {
        matches!(self, Self::ReviewCoordinator | Self::Reviewer | Self::Submitter)
    }
}

impl TryFrom<i32> for Role {
    type Error = UnknownRole;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|role| i32::from(role.id()) == id)
            .ok_or(UnknownRole(id))
    }
}

impl TryFrom<i16> for Role {
    type Error = UnknownRole;

    fn try_from(id: i16) -> Result<Self, Self::Error> {
        Self::try_from(i32::from(id))
    }
}

impl From<Role> for i16 {
    fn from(value: Role) -> Self {
        value.id()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
