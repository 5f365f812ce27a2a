use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use folio_common::NotificationId;
use serde::Serialize;

use crate::domain::{
    AppState,
    notifications::{self, Notification},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::session::CurrentUser;

#[derive(Debug, Clone, Serialize)]
pub struct MarkedResponse {
    updated: u64,
}

pub async fn my_notifications<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiSuccess<Vec<Notification>>, ApiError> {
    let result = notifications::notifications_for_user(state.repository(), user.id).await?;
    Ok(ApiSuccess::ok(result))
}

pub async fn mark_read<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError> {
    notifications::mark_notification_read(state.repository(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
) -> Result<ApiSuccess<MarkedResponse>, ApiError> {
    let updated = notifications::mark_all_notifications_read(state.repository(), user.id).await?;
    Ok(ApiSuccess::ok(MarkedResponse { updated }))
}
