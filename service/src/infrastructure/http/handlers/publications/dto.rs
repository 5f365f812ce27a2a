use folio_common::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::publications::{CreatePublication, StyleCriteriaInput};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePublicationRequest {
    pub name: String,
    pub is_publicly_visible: Option<bool>,
    pub is_accepting_submissions: Option<bool>,
}

impl From<CreatePublicationRequest> for CreatePublication {
    fn from(value: CreatePublicationRequest) -> Self {
        Self {
            name: value.name,
            is_publicly_visible: value.is_publicly_visible,
            is_accepting_submissions: value.is_accepting_submissions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignUserRequest {
    pub user_id: UserId,
    pub role_id: i16,
}

/// Result of a role assignment.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    pub user_id: UserId,
    pub role_id: i16,
    pub role_name: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleCriteriaRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl From<StyleCriteriaRequest> for StyleCriteriaInput {
    fn from(value: StyleCriteriaRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            icon: value.icon,
        }
    }
}
