use folio_common::{CommentId, SubmissionId};

use super::{PostgresRepository, row_into, rows_into};
use crate::domain::{
    comments::{Comment, CommentKind, NewComment},
    repository::{CommentRepository, RepositoryError},
};

impl CommentRepository for PostgresRepository {
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, RepositoryError> {
        let kind = comment.kind.code();
        let (from, to, style_criteria) = match comment.kind {
            CommentKind::Inline { from, to, style_criteria } => (
                Some(from),
                Some(to),
                style_criteria.into_iter().map(|id| id.0).collect(),
            ),
            CommentKind::Overall => (None, None, Vec::new()),
        };

        let row = sqlx::query(
            r#"INSERT INTO comments (submission_id, kind, content, from_offset, to_offset,
                                     style_criteria, parent_id, reply_to_id, created_by, updated_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING *"#,
        )
        .bind(comment.submission_id.0)
        .bind(kind)
        .bind(comment.content)
        .bind(from)
        .bind(to)
        .bind::<Vec<i64>>(style_criteria)
        .bind(comment.parent_id.map(|id| id.0))
        .bind(comment.reply_to_id.map(|id| id.0))
        .bind(comment.created_by.0)
        .fetch_one(self.pool())
        .await?;
        Ok(Comment::try_from(row)?)
    }

    async fn find_comment(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn comments_for_submission(&self, submission_id: SubmissionId) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM comments
               WHERE submission_id = $1 AND deleted_at IS NULL
               ORDER BY created_at, id"#,
        )
        .bind(submission_id.0)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn soft_delete_comment(&self, id: CommentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE comments SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id.0)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
