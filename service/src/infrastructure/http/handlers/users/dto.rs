use folio_common::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::users::{CreateUser, UpdateUser};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl From<RegisterRequest> for CreateUser {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            username: value.username,
            password: value.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub profile_metadata: Option<Value>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            email: value.email,
            name: value.name,
            username: value.username,
            password: value.password,
            profile_metadata: value.profile_metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendVerificationRequest {
    pub id: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
    pub expires: String,
}

/// Address a verification link was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResponse {
    pub email: String,
}
