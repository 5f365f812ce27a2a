use folio_common::{
    CommentId, ContentId, NotificationId, PublicationId, Role, StyleCriteriaId, SubmissionId,
    SubmissionStatus, UserId,
};
use sqlx::{Row, postgres::PgRow};

use crate::domain::{
    RoleAssignment,
    comments::{Comment, CommentKind},
    notifications::Notification,
    publications::{Publication, StyleCriteria},
    submissions::{Submission, SubmissionContent, UserSubmission},
    users::User,
};

fn role(row: &PgRow, column: &str) -> Result<Role, sqlx::Error> {
    let id: i16 = row.try_get(column)?;
    Role::try_from(id).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn status(row: &PgRow) -> Result<SubmissionStatus, sqlx::Error> {
    let code: i16 = row.try_get("status")?;
    SubmissionStatus::try_from(code).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl TryFrom<PgRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.try_get("id")?),
            name: row.try_get("name")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            profile_metadata: row.try_get("profile_metadata")?,
            email_verified_at: row.try_get("email_verified_at")?,
            staged: row.try_get("staged")?,
            roles: row.try_get("roles")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<PgRow> for RoleAssignment {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(RoleAssignment {
            id: row.try_get("id")?,
            user_id: UserId(row.try_get("user_id")?),
            role: role(&row, "role_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<PgRow> for Publication {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(Publication {
            id: PublicationId(row.try_get("id")?),
            name: row.try_get("name")?,
            is_publicly_visible: row.try_get("is_publicly_visible")?,
            is_accepting_submissions: row.try_get("is_accepting_submissions")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<PgRow> for StyleCriteria {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(StyleCriteria {
            id: StyleCriteriaId(row.try_get("id")?),
            publication_id: PublicationId(row.try_get("publication_id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            icon: row.try_get("icon")?,
        })
    }
}

impl TryFrom<PgRow> for Submission {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(Submission {
            id: SubmissionId(row.try_get("id")?),
            title: row.try_get("title")?,
            publication_id: PublicationId(row.try_get("publication_id")?),
            status: status(&row)?,
            status_change_comment: row.try_get("status_change_comment")?,
            content_id: row.try_get::<Option<i64>, _>("content_id")?.map(ContentId),
            created_by: UserId(row.try_get("created_by")?),
            updated_by: UserId(row.try_get("updated_by")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<PgRow> for UserSubmission {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(UserSubmission {
            submission_id: SubmissionId(row.try_get("id")?),
            title: row.try_get("title")?,
            publication_id: PublicationId(row.try_get("publication_id")?),
            status: status(&row)?,
            role: role(&row, "role_id")?,
        })
    }
}

impl TryFrom<PgRow> for SubmissionContent {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(SubmissionContent {
            id: ContentId(row.try_get("id")?),
            submission_id: SubmissionId(row.try_get("submission_id")?),
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<PgRow> for Comment {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        let kind = match row.try_get::<i16, _>("kind")? {
            CommentKind::INLINE => CommentKind::Inline {
                from: row.try_get::<Option<i32>, _>("from_offset")?.unwrap_or_default(),
                to: row.try_get::<Option<i32>, _>("to_offset")?.unwrap_or_default(),
                style_criteria: row
                    .try_get::<Vec<i64>, _>("style_criteria")?
                    .into_iter()
                    .map(StyleCriteriaId)
                    .collect(),
            },
            _ => CommentKind::Overall,
        };

        Ok(Comment {
            id: CommentId(row.try_get("id")?),
            submission_id: SubmissionId(row.try_get("submission_id")?),
            kind,
            content: row.try_get("content")?,
            parent_id: row.try_get::<Option<i64>, _>("parent_id")?.map(CommentId),
            reply_to_id: row.try_get::<Option<i64>, _>("reply_to_id")?.map(CommentId),
            created_by: UserId(row.try_get("created_by")?),
            updated_by: UserId(row.try_get("updated_by")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl TryFrom<PgRow> for Notification {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: NotificationId(row.try_get("id")?),
            user_id: UserId(row.try_get("user_id")?),
            kind: row.try_get("kind")?,
            data: row.try_get("data")?,
            read_at: row.try_get("read_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
