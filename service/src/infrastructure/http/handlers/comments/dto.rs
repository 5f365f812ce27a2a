use folio_common::CommentId;
use serde::Deserialize;

use crate::domain::comments::{CommentKind, CreateComment};

/// `kind` defaults to an overall comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub kind: CommentKind,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub reply_to_id: Option<CommentId>,
}

impl From<CreateCommentRequest> for CreateComment {
    fn from(value: CreateCommentRequest) -> Self {
        Self {
            kind: value.kind,
            content: value.content,
            parent_id: value.parent_id,
            reply_to_id: value.reply_to_id,
        }
    }
}
