use axum::http::StatusCode;
use folio_common::SubmissionStatus;
use serde::Serialize;

use crate::infrastructure::http::api::{ApiError, ApiSuccess};

pub mod auth;
pub mod comments;
pub mod navigation;
pub mod notifications;
pub mod publications;
pub mod submissions;
pub mod users;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    code: i16,
    name: &'static str,
}

/// Every submission status with its display name.
pub async fn submission_statuses() -> Result<ApiSuccess<Vec<StatusResponse>>, ApiError> {
    let statuses = SubmissionStatus::ALL
        .iter()
        .map(|status| StatusResponse {
            code: status.code(),
            name: status.name(),
        })
        .collect();
    Ok(ApiSuccess::ok(statuses))
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::testing::*;
    use crate::infrastructure::memory::MemoryRepository;

    #[tokio::test]
    async fn lists_submission_statuses() {
        let app = app(state(&MemoryRepository::default()));

        let (status, body) = send(&app, request("GET", "/api/submission-statuses", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let statuses = body["data"].as_array().unwrap();
        assert_eq!(statuses.len(), 13);
        assert_eq!(statuses[0]["code"], 0);
    }

    #[tokio::test]
    async fn health_check_answers() {
        let app = app(state(&MemoryRepository::default()));
        let (status, _) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
