use folio_common::{NotificationId, UserId};

use super::{PostgresRepository, rows_into};
use crate::domain::{
    notifications::{NewNotification, Notification},
    repository::{NotificationRepository, RepositoryError},
};

impl NotificationRepository for PostgresRepository {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO notifications (user_id, kind, data) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(notification.user_id.0)
        .bind(notification.kind)
        .bind(notification.data)
        .fetch_one(self.pool())
        .await?;
        Ok(Notification::try_from(row)?)
    }

    async fn notifications_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.0)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn mark_notification_read(&self, user_id: UserId, id: NotificationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE notifications SET read_at = COALESCE(read_at, now())
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id.0)
        .bind(user_id.0)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE notifications SET read_at = now() WHERE user_id = $1 AND read_at IS NULL")
            .bind(user_id.0)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
