use std::sync::LazyLock;

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;

use crate::domain::{
    AppState,
    navigation::{NavigationOutcome, Navigator, RepositoryQueries, RouteTable},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::querystring::QueryString;
use crate::infrastructure::http::session::{LOGIN_REDIRECT_COOKIE, MaybeUser, set_cookie};

static ROUTES: LazyLock<RouteTable> = LazyLock::new(RouteTable::default);

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationQuery {
    pub path: String,
}

/// Runs the client route guards for `path` on behalf of the caller.
pub async fn navigate<S: AppState>(
    State(state): State<S>,
    MaybeUser(user): MaybeUser,
    QueryString(query): QueryString<NavigationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let queries = RepositoryQueries::new(state.repository(), user.as_ref());
    let outcome = Navigator::new(&ROUTES, &queries).resolve(&query.path).await;
    tracing::debug!(path = %query.path, ?outcome, "navigation resolved");

    let cookies = match &outcome {
        NavigationOutcome::Redirect {
            remember: Some(path),
            ..
        } => vec![(SET_COOKIE, set_cookie(LOGIN_REDIRECT_COOKIE, path.clone()))],
        _ => Vec::new(),
    };
    Ok((AppendHeaders(cookies), ApiSuccess::ok(outcome)))
}
