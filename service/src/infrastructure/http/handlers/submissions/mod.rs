use axum::{
    Json,
    extract::{Path, State},
};
use folio_common::SubmissionId;

use crate::domain::{
    AppState, RoleAssignment,
    submissions::{self, Submission, SubmissionContent, SubmissionDetails, UserSubmission},
    users::User,
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::submissions::dto::{
    ContentRequest, CreateSubmissionRequest, StageUserRequest, UpdateSubmissionRequest,
};
use crate::infrastructure::http::session::CurrentUser;

mod dto;

/// Submissions the signed in user is directly connected to.
pub async fn my_submissions<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiSuccess<Vec<UserSubmission>>, ApiError> {
    let result = submissions::submissions_for_user(state.repository(), user.id).await?;
    Ok(ApiSuccess::ok(result))
}

pub async fn create_submission<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<ApiSuccess<Submission>, ApiError> {
    let submission = submissions::create_submission(state.repository(), &user, body.into()).await?;
    Ok(ApiSuccess::created(submission))
}

pub async fn find_submission<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
) -> Result<ApiSuccess<SubmissionDetails>, ApiError> {
    let details = submissions::find_submission(state.repository(), &user, id).await?;
    Ok(ApiSuccess::ok(details))
}

pub async fn update_submission<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
    Json(body): Json<UpdateSubmissionRequest>,
) -> Result<ApiSuccess<SubmissionDetails>, ApiError> {
    let details = submissions::update_submission(
        state.repository(),
        state.notifier(),
        &user,
        id,
        body.try_into()?,
    )
    .await?;
    Ok(ApiSuccess::ok(details))
}

pub async fn submission_users<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
) -> Result<ApiSuccess<Vec<RoleAssignment>>, ApiError> {
    let users = submissions::submission_users(state.repository(), &user, id).await?;
    Ok(ApiSuccess::ok(users))
}

pub async fn stage_user<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
    Json(body): Json<StageUserRequest>,
) -> Result<ApiSuccess<User>, ApiError> {
    let role = body.role()?;
    let staged = submissions::stage_user(state.repository(), &user, id, &body.email, role).await?;
    Ok(ApiSuccess::created(staged))
}

pub async fn content_history<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
) -> Result<ApiSuccess<Vec<SubmissionContent>>, ApiError> {
    let history = submissions::content_history(state.repository(), &user, id).await?;
    Ok(ApiSuccess::ok(history))
}

pub async fn append_content<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
    Json(body): Json<ContentRequest>,
) -> Result<ApiSuccess<SubmissionContent>, ApiError> {
    let content = submissions::append_content(state.repository(), &user, id, body.data).await?;
    Ok(ApiSuccess::created(content))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use folio_common::{Role, SubmissionStatus};
    use serde_json::json;

    use crate::domain::AppState;
    use crate::domain::repository::SubmissionRepository;
    use crate::infrastructure::http::handlers::testing::*;
    use crate::infrastructure::memory::{MemoryRepository, fixtures};

    #[tokio::test]
    async fn submitters_hand_in_their_drafts() {
        let repository = MemoryRepository::default();
        fixtures::user(&repository, "author").await;
        let publication = fixtures::publication(&repository, "Open Journal").await;
        let state = state(&repository);
        let app = app(state.clone());
        let token = sign_in(&app, "author@example.org").await;

        let body = json!({ "title": "On Testing", "publication_id": publication.id });
        let (status, created) = send(&app, request("POST", "/api/submissions", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_i64().unwrap();

        let (_, mine) = send(&app, request("GET", "/api/submissions", Some(&token), None)).await;
        assert_eq!(mine["data"][0]["role"], Role::Submitter.id());

        let content = format!("/api/submissions/{}/content", id);
        let (status, _) = send(&app, request("POST", &content, Some(&token), Some(json!({ "data": "<p>v1</p>" })))).await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/submissions/{}", id);
        let skip_ahead = json!({ "status": SubmissionStatus::AcceptedAsFinal.code() });
        let (status, _) = send(&app, request("PUT", &uri, Some(&token), Some(skip_ahead))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let hand_in = json!({ "status": SubmissionStatus::InitiallySubmitted.code() });
        let (status, updated) = send(&app, request("PUT", &uri, Some(&token), Some(hand_in))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["status_name"], "INITIALLY_SUBMITTED");
        assert_eq!(state.notifier().events().len(), 1);

        let (status, _) = send(&app, request("POST", &content, Some(&token), Some(json!({ "data": "<p>v2</p>" })))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_status_codes_are_rejected() {
        let repository = MemoryRepository::default();
        let author = fixtures::user(&repository, "author").await;
        let submission = fixtures::submission(&repository, &author, "Paper").await;
        let app = app(state(&repository));
        let token = sign_in(&app, "author@example.org").await;

        let uri = format!("/api/submissions/{}", submission.id);
        let (status, _) = send(&app, request("PUT", &uri, Some(&token), Some(json!({ "status": 99 })))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn coordinators_stage_reviewers() {
        let repository = MemoryRepository::default();
        let author = fixtures::user(&repository, "author").await;
        let coordinator = fixtures::user(&repository, "coordinator").await;
        let submission = fixtures::submission(&repository, &author, "Paper").await;
        repository
            .attach_submission_user(submission.id, coordinator.id, Role::ReviewCoordinator)
            .await
            .unwrap();
        let app = app(state(&repository));
        let coordinator = sign_in(&app, "coordinator@example.org").await;
        let author = sign_in(&app, "author@example.org").await;

        let stage = format!("/api/submissions/{}/stage", submission.id);
        let body = json!({ "email": "new.reviewer@example.org", "role_id": Role::Reviewer.id() });
        let (status, _) = send(&app, request("POST", &stage, Some(&author), Some(body.clone()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, staged) = send(&app, request("POST", &stage, Some(&coordinator), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(staged["data"]["staged"], true);

        let users = format!("/api/submissions/{}/users", submission.id);
        let (status, listed) = send(&app, request("GET", &users, Some(&author), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn strangers_cannot_see_submissions() {
        let repository = MemoryRepository::default();
        let author = fixtures::user(&repository, "author").await;
        fixtures::user(&repository, "stranger").await;
        let submission = fixtures::submission(&repository, &author, "Paper").await;
        let app = app(state(&repository));
        let token = sign_in(&app, "stranger@example.org").await;

        let uri = format!("/api/submissions/{}", submission.id);
        let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, request("GET", &uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, request("GET", "/api/submissions/999", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
