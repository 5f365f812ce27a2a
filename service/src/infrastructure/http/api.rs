use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::DomainError;
use crate::domain::repository::RepositoryError;

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<ApiResponseBody<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }

    pub(crate) fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub(crate) fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, data)
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError is a wrapper around a response that includes a status code.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    ConflictWithServerState(String),
    Unauthorized(String),
    Forbidden,
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => Self::NotFound("record not found".to_string()),
            RepositoryError::ValidationFailed(cause) => Self::UnprocessableEntity(cause),
            RepositoryError::UniqueViolation(cause) => Self::ConflictWithServerState(cause),
            RepositoryError::DatabaseError(cause) => {
                tracing::error!("{:?}", cause);
                Self::InternalServerError("Database server error".to_string())
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        match value {
            e @ (DomainError::InvalidCredentials | DomainError::Unauthenticated) => {
                Self::Unauthorized(e.to_string())
            }
            DomainError::Forbidden => Self::Forbidden,
            e @ DomainError::NotFound(_) => Self::NotFound(e.to_string()),
            DomainError::Validation(message) => Self::UnprocessableEntity(message),
            DomainError::Conflict(message) => Self::ConflictWithServerState(message),
            DomainError::Internal(message) => Self::InternalServerError(message),
            DomainError::Repository(e) => e.into(),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ConflictWithServerState(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use ApiError::*;

        let status = self.status_code();
        let message = match self {
            InternalServerError(e) => {
                tracing::error!("{}", e);
                "Internal server error".to_string()
            }
            Forbidden => "Forbidden".to_string(),
            UnprocessableEntity(message)
            | ConflictWithServerState(message)
            | Unauthorized(message)
            | NotFound(message) => message,
        };
        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

// Generic response structure shared by all API responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize> {
    pub status_code: u16,
    pub data: T,
}

impl<T: Serialize> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
