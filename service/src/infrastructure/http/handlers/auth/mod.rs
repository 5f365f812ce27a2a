use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};

use crate::domain::{AppState, auth, users::User};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::auth::dto::{LoginRequest, LoginResponse};
use crate::infrastructure::http::session::{
    CurrentUser, LOGIN_REDIRECT_COOKIE, SESSION_COOKIE, cookie_value, remove_cookie, session_token,
    set_cookie,
};

mod dto;

// only same-origin paths are followed after signing in
fn local_path(path: String) -> Option<String> {
    (path.starts_with('/') && !path.starts_with("//")).then_some(path)
}

pub async fn login<S: AppState>(
    State(state): State<S>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, token) = auth::login(state.repository(), &body.email, &body.password).await?;
    tracing::info!(user_id = %user.id, "user signed in");

    let redirect_to = cookie_value(&headers, LOGIN_REDIRECT_COOKIE).and_then(local_path);
    let cookies = AppendHeaders([
        (SET_COOKIE, set_cookie(SESSION_COOKIE, token.clone())),
        (SET_COOKIE, remove_cookie(LOGIN_REDIRECT_COOKIE)),
    ]);
    let response = LoginResponse {
        user,
        token,
        redirect_to,
    };
    Ok((cookies, ApiSuccess::ok(response)))
}

pub async fn logout<S: AppState>(
    State(state): State<S>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        auth::logout(state.repository(), &token).await?;
    }
    Ok((
        AppendHeaders([(SET_COOKIE, remove_cookie(SESSION_COOKIE))]),
        StatusCode::NO_CONTENT,
    ))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Result<ApiSuccess<User>, ApiError> {
    Ok(ApiSuccess::ok(user))
}
