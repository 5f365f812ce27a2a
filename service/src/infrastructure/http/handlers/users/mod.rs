use axum::{
    Json,
    extract::{Path, State},
};
use folio_common::UserId;

use crate::domain::{
    AppState,
    users::{self, EmailVerification, User},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::users::dto::{
    RegisterRequest, SendVerificationRequest, UpdateUserRequest, VerificationResponse,
    VerifyEmailRequest,
};
use crate::infrastructure::http::session::CurrentUser;

mod dto;

// links are written to the log until a mailer is configured
fn deliver(verification: &EmailVerification) {
    tracing::info!(
        email = %verification.email,
        url = %verification.url,
        "email verification link issued"
    );
}

pub async fn register<S: AppState>(
    State(state): State<S>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<User>, ApiError> {
    let user = users::create_user(state.repository(), body.into()).await?;
    Ok(ApiSuccess::created(user))
}

pub async fn update_user<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<User>, ApiError> {
    let (user, verification) = users::update_user(
        state.repository(),
        state.verification(),
        &actor,
        id,
        body.into(),
    )
    .await?;
    if let Some(verification) = verification {
        deliver(&verification);
    }
    Ok(ApiSuccess::ok(user))
}

pub async fn send_verification<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Json(body): Json<SendVerificationRequest>,
) -> Result<ApiSuccess<VerificationResponse>, ApiError> {
    let (_, verification) =
        users::send_email_verification(state.repository(), state.verification(), &actor, body.id)
            .await?;
    deliver(&verification);
    Ok(ApiSuccess::ok(VerificationResponse {
        email: verification.email,
    }))
}

pub async fn verify_email<S: AppState>(
    State(state): State<S>,
    CurrentUser(actor): CurrentUser,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<ApiSuccess<User>, ApiError> {
    let user = users::verify_email(
        state.repository(),
        state.verification(),
        &actor,
        &body.token,
        &body.expires,
    )
    .await?;
    Ok(ApiSuccess::ok(user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;

    use crate::domain::AppState;
    use crate::domain::users::verification_for;
    use crate::infrastructure::http::handlers::testing::*;
    use crate::infrastructure::memory::{MemoryRepository, fixtures};

    #[tokio::test]
    async fn registration_validates_and_rejects_duplicates() {
        let app = app(state(&MemoryRepository::default()));
        let body = json!({
            "email": "grace@example.org",
            "username": "grace",
            "password": "long enough secret",
        });

        let (status, created) = send(&app, request("POST", "/api/users", None, Some(body.clone()))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["email"], "grace@example.org");

        let (status, _) = send(&app, request("POST", "/api/users", None, Some(body))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let short = json!({ "email": "x@example.org", "username": "x", "password": "short" });
        let (status, _) = send(&app, request("POST", "/api/users", None, Some(short))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn users_only_edit_themselves() {
        let repository = MemoryRepository::default();
        fixtures::user(&repository, "ada").await;
        let other = fixtures::user(&repository, "bob").await;
        let app = app(state(&repository));
        let token = sign_in(&app, "ada@example.org").await;

        let uri = format!("/api/users/{}", other.id);
        let body = json!({ "name": "Mallory" });
        let (status, _) = send(&app, request("PUT", &uri, Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn verification_links_mark_the_email_verified() {
        let repository = MemoryRepository::default();
        let user = fixtures::user(&repository, "ada").await;
        let state = state(&repository);
        let verification = verification_for(state.verification(), &user, Utc::now());
        let app = app(state);
        let token = sign_in(&app, "ada@example.org").await;

        let (status, _) = send(
            &app,
            request("POST", "/api/email/verification/send", Some(&token), Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mut parts = verification.url.rsplit('/');
        let hash = parts.next().unwrap();
        let expires = parts.next().unwrap();
        let body = json!({ "token": hash, "expires": expires });
        let (status, verified) =
            send(&app, request("POST", "/api/email/verify", Some(&token), Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(verified["data"]["email_verified_at"].is_string());

        let forged = json!({ "token": "00", "expires": expires });
        let (status, _) = send(&app, request("POST", "/api/email/verify", Some(&token), Some(forged))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
