//! Session cookie and bearer token handling.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};
use cookie::{Cookie, SameSite};

use crate::domain::{AppState, DomainError, auth, users::User};
use crate::infrastructure::http::api::ApiError;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_REDIRECT_COOKIE: &str = "login_redirect";

/// Value of the cookie `name` sent with the request.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Session token from the `Authorization: Bearer` header or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    bearer.or_else(|| cookie_value(headers, SESSION_COOKIE))
}

fn header(cookie: Cookie<'_>) -> HeaderValue {
    // percent encoding leaves only visible ascii
    HeaderValue::from_str(&cookie.encoded().to_string()).unwrap_or_else(|_| HeaderValue::from_static(""))
}

pub fn set_cookie(name: &'static str, value: String) -> HeaderValue {
    let cookie = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    header(cookie)
}

pub fn remove_cookie(name: &'static str) -> HeaderValue {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    header(cookie)
}

/// The signed in user; rejects the request with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The signed in user, if there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S: AppState> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match session_token(&parts.headers) {
            Some(token) => Ok(MaybeUser(auth::session_user(state.repository(), &token).await?)),
            None => Ok(MaybeUser(None)),
        }
    }
}

impl<S: AppState> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser)
            .ok_or_else(|| DomainError::Unauthenticated.into())
    }
}
