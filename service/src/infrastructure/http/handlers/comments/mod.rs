use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use folio_common::{CommentId, SubmissionId};

use crate::domain::{
    AppState,
    comments::{self, Comment, CommentThread},
};
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::comments::dto::CreateCommentRequest;
use crate::infrastructure::http::session::CurrentUser;

mod dto;

pub async fn comment_tree<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
) -> Result<ApiSuccess<Vec<CommentThread>>, ApiError> {
    let threads = comments::comment_tree(state.repository(), &user, id).await?;
    Ok(ApiSuccess::ok(threads))
}

pub async fn create_comment<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<SubmissionId>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<ApiSuccess<Comment>, ApiError> {
    let comment = comments::create_comment(state.repository(), &user, id, body.into()).await?;
    Ok(ApiSuccess::created(comment))
}

pub async fn delete_comment<S: AppState>(
    State(state): State<S>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<CommentId>,
) -> Result<StatusCode, ApiError> {
    comments::delete_comment(state.repository(), &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
