use folio_common::{PublicationId, Role, SubmissionStatus, UserId};
use serde::Deserialize;

use crate::domain::submissions::{CreateSubmission, UpdateSubmission, UserConnections};
use crate::infrastructure::http::api::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubmissionRequest {
    pub title: String,
    pub publication_id: PublicationId,
}

impl From<CreateSubmissionRequest> for CreateSubmission {
    fn from(value: CreateSubmissionRequest) -> Self {
        Self {
            title: value.title,
            publication_id: value.publication_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionsRequest {
    #[serde(default)]
    pub connect: Vec<UserId>,
    #[serde(default)]
    pub disconnect: Vec<UserId>,
}

impl From<ConnectionsRequest> for UserConnections {
    fn from(value: ConnectionsRequest) -> Self {
        Self {
            connect: value.connect,
            disconnect: value.disconnect,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubmissionRequest {
    pub title: Option<String>,
    /// Status code
    pub status: Option<i16>,
    pub status_change_comment: Option<String>,
    pub reviewers: Option<ConnectionsRequest>,
    pub review_coordinators: Option<ConnectionsRequest>,
    pub submitters: Option<ConnectionsRequest>,
}

impl TryFrom<UpdateSubmissionRequest> for UpdateSubmission {
    type Error = ApiError;

    fn try_from(value: UpdateSubmissionRequest) -> Result<Self, Self::Error> {
        let status = value
            .status
            .map(SubmissionStatus::try_from)
            .transpose()
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
        Ok(Self {
            title: value.title,
            status,
            status_change_comment: value.status_change_comment,
            reviewers: value.reviewers.map(Into::into),
            review_coordinators: value.review_coordinators.map(Into::into),
            submitters: value.submitters.map(Into::into),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageUserRequest {
    pub email: String,
    pub role_id: i16,
}

impl StageUserRequest {
    pub fn role(&self) -> Result<Role, ApiError> {
        Role::try_from(self.role_id).map_err(|e| ApiError::UnprocessableEntity(e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    pub data: String,
}
