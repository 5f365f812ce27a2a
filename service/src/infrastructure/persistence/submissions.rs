use folio_common::{Role, SubmissionId, UserId};

use super::{PostgresRepository, row_into, rows_into};
use crate::domain::{
    RoleAssignment,
    repository::{RepositoryError, SubmissionRepository},
    submissions::{NewSubmission, RoleChanges, Submission, SubmissionContent, UserSubmission},
};

impl SubmissionRepository for PostgresRepository {
    async fn insert_submission(&self, submission: NewSubmission) -> Result<Submission, RepositoryError> {
        let mut transaction = self.pool().begin().await?;

        let row = sqlx::query(
            r#"INSERT INTO submissions (title, publication_id, created_by, updated_by)
               VALUES ($1, $2, $3, $3)
               RETURNING *"#,
        )
        .bind(submission.title.into_inner())
        .bind(submission.publication_id.0)
        .bind(submission.created_by.0)
        .fetch_one(&mut *transaction)
        .await?;
        let inserted = Submission::try_from(row)?;

        sqlx::query("INSERT INTO submission_user (submission_id, user_id, role_id) VALUES ($1, $2, $3)")
            .bind(inserted.id.0)
            .bind(submission.created_by.0)
            .bind(Role::Submitter.id())
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        Ok(inserted)
    }

    async fn find_submission(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM submissions WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn update_submission(
        &self,
        submission: &Submission,
        changes: &RoleChanges,
    ) -> Result<Submission, RepositoryError> {
        let mut transaction = self.pool().begin().await?;

        let row = sqlx::query(
            r#"UPDATE submissions
               SET title = $2, status = $3, status_change_comment = $4,
                   updated_by = $5, updated_at = now()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(submission.id.0)
        .bind(&submission.title)
        .bind(submission.status.code())
        .bind(&submission.status_change_comment)
        .bind(submission.updated_by.0)
        .fetch_optional(&mut *transaction)
        .await?;
        let updated = row_into(row)?.ok_or(RepositoryError::NotFound)?;

        for (user_id, role) in &changes.detach {
            sqlx::query("DELETE FROM submission_user WHERE submission_id = $1 AND user_id = $2 AND role_id = $3")
                .bind(submission.id.0)
                .bind(user_id.0)
                .bind(role.id())
                .execute(&mut *transaction)
                .await?;
        }
        for (user_id, role) in &changes.attach {
            sqlx::query("INSERT INTO submission_user (submission_id, user_id, role_id) VALUES ($1, $2, $3)")
                .bind(submission.id.0)
                .bind(user_id.0)
                .bind(role.id())
                .execute(&mut *transaction)
                .await?;
        }

        transaction.commit().await?;
        Ok(updated)
    }

    async fn submission_users(&self, submission_id: SubmissionId) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, role_id, created_at FROM submission_user
               WHERE submission_id = $1 ORDER BY id"#,
        )
        .bind(submission_id.0)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn attach_submission_user(
        &self,
        submission_id: SubmissionId,
        user_id: UserId,
        role: Role,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO submission_user (submission_id, user_id, role_id) VALUES ($1, $2, $3)")
            .bind(submission_id.0)
            .bind(user_id.0)
            .bind(role.id())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn submissions_for_user(&self, user_id: UserId) -> Result<Vec<UserSubmission>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT s.id, s.title, s.publication_id, s.status, su.role_id
               FROM submission_user su
               JOIN submissions s ON s.id = su.submission_id
               WHERE su.user_id = $1
               ORDER BY su.id"#,
        )
        .bind(user_id.0)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn append_content(&self, submission_id: SubmissionId, data: String) -> Result<SubmissionContent, RepositoryError> {
        let mut transaction = self.pool().begin().await?;

        let row = sqlx::query(
            "INSERT INTO submission_contents (submission_id, data) VALUES ($1, $2) RETURNING *",
        )
        .bind(submission_id.0)
        .bind(data)
        .fetch_one(&mut *transaction)
        .await?;
        let content = SubmissionContent::try_from(row)?;

        let updated = sqlx::query("UPDATE submissions SET content_id = $2, updated_at = now() WHERE id = $1")
            .bind(submission_id.0)
            .bind(content.id.0)
            .execute(&mut *transaction)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        transaction.commit().await?;
        Ok(content)
    }

    async fn content_history(&self, submission_id: SubmissionId) -> Result<Vec<SubmissionContent>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM submission_contents WHERE submission_id = $1 ORDER BY id")
            .bind(submission_id.0)
            .fetch_all(self.pool())
            .await?;
        rows_into(rows)
    }
}
