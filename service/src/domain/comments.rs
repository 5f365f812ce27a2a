use std::collections::HashSet;

use chrono::{DateTime, Utc};
use folio_common::{CommentId, StyleCriteriaId, SubmissionId, UserId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError,
    access,
    repository::{CommentRepository, PublicationRepository, SubmissionRepository},
    users::User,
};

/// Overall comments address the whole submission, inline comments a range
/// of its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommentKind {
    #[default]
    Overall,
    Inline {
        from: i32,
        to: i32,
        #[serde(default)]
        style_criteria: Vec<StyleCriteriaId>,
    },
}

impl CommentKind {
    pub const OVERALL: i16 = 0;
    pub const INLINE: i16 = 1;

    pub fn code(&self) -> i16 {
        match self {
            Self::Overall => Self::OVERALL,
            Self::Inline { .. } => Self::INLINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub submission_id: SubmissionId,
    #[serde(flatten)]
    pub kind: CommentKind,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub reply_to_id: Option<CommentId>,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub submission_id: SubmissionId,
    pub kind: CommentKind,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub reply_to_id: Option<CommentId>,
    pub created_by: UserId,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub kind: CommentKind,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub reply_to_id: Option<CommentId>,
}

/// A top level comment and its replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

async fn validate_reply(
    repository: &impl CommentRepository,
    submission_id: SubmissionId,
    parent_id: CommentId,
    reply_to_id: Option<CommentId>,
) -> Result<(), DomainError> {
    let parent = repository
        .find_comment(parent_id)
        .await?
        .filter(|c| c.deleted_at.is_none() && c.submission_id == submission_id)
        .ok_or_else(|| DomainError::validation("parent comment does not exist"))?;
    if parent.parent_id.is_some() {
        return Err(DomainError::validation("replies can only be made to top level comments"));
    }

    match reply_to_id {
        None => Ok(()),
        Some(id) if id == parent_id => Ok(()),
        Some(id) => {
            let in_thread = repository
                .find_comment(id)
                .await?
                .is_some_and(|c| c.parent_id == Some(parent_id) && c.deleted_at.is_none());
            if in_thread {
                Ok(())
            } else {
                Err(DomainError::validation("reply must address a comment of the same thread"))
            }
        }
    }
}

pub async fn create_comment<R>(
    repository: &R,
    actor: &User,
    submission_id: SubmissionId,
    input: CreateComment,
) -> Result<Comment, DomainError>
where
    R: CommentRepository + PublicationRepository + SubmissionRepository,
{
    let content = input.content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("comment must not be empty"));
    }
    let access = access::authorize_read(repository, actor, submission_id).await?;

    if let CommentKind::Inline { from, to, style_criteria } = &input.kind {
        if *from < 0 || from > to {
            return Err(DomainError::validation("inline comment range is invalid"));
        }
        if !style_criteria.is_empty() {
            let known: HashSet<StyleCriteriaId> = repository
                .style_criteria(access.submission.publication_id)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            if let Some(unknown) = style_criteria.iter().find(|id| !known.contains(id)) {
                return Err(DomainError::Validation(format!("unknown style criteria {}", unknown)));
            }
        }
    }

    match (input.parent_id, input.reply_to_id) {
        (Some(parent_id), reply_to_id) => {
            validate_reply(repository, submission_id, parent_id, reply_to_id).await?
        }
        (None, Some(_)) => return Err(DomainError::validation("a reply needs a parent comment")),
        (None, None) => {}
    }

    let comment = repository
        .insert_comment(NewComment {
            submission_id,
            kind: input.kind,
            content: content.to_string(),
            parent_id: input.parent_id,
            reply_to_id: input.reply_to_id,
            created_by: actor.id,
        })
        .await?;
    tracing::debug!(comment_id = %comment.id, %submission_id, "comment created");
    Ok(comment)
}

/// Top level comments in creation order, each with its replies.
pub async fn comment_tree<R>(
    repository: &R,
    actor: &User,
    submission_id: SubmissionId,
) -> Result<Vec<CommentThread>, DomainError>
where
    R: CommentRepository + PublicationRepository + SubmissionRepository,
{
    access::authorize_read(repository, actor, submission_id).await?;

    let (top_level, replies): (Vec<Comment>, Vec<Comment>) = repository
        .comments_for_submission(submission_id)
        .await?
        .into_iter()
        .sorted_by_key(|c| (c.created_at, c.id))
        .partition(|c| c.parent_id.is_none());
    let mut replies = replies
        .into_iter()
        .filter_map(|c| c.parent_id.map(|parent| (parent, c)))
        .into_group_map();

    Ok(top_level
        .into_iter()
        .map(|comment| CommentThread {
            replies: replies.remove(&comment.id).unwrap_or_default(),
            comment,
        })
        .collect())
}

/// Soft deletes a comment. Authors delete their own comments, coordinators
/// any comment of the submission.
pub async fn delete_comment<R>(
    repository: &R,
    actor: &User,
    id: CommentId,
) -> Result<(), DomainError>
where
    R: CommentRepository + PublicationRepository + SubmissionRepository,
{
    let comment = repository
        .find_comment(id)
        .await?
        .filter(|c| c.deleted_at.is_none())
        .ok_or(DomainError::NotFound("comment"))?;

    let access = access::authorize_read(repository, actor, comment.submission_id).await?;
    if comment.created_by != actor.id && !access.can_manage() {
        return Err(DomainError::Forbidden);
    }
    repository.soft_delete_comment(id).await?;
    Ok(())
}
