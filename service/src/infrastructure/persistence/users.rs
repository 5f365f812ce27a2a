use folio_common::{Email, Role, UserId};

use super::{PostgresRepository, row_into};
use crate::domain::{
    repository::{RepositoryError, SessionRepository, UserRepository},
    users::{NewUser, User},
};

// users joined with the names of their global roles
fn select_users(filter: &str) -> String {
    format!(
        r#"SELECT u.id, u.name, u.username, u.email, u.password, u.profile_metadata,
                  u.email_verified_at, u.staged, u.created_at, u.updated_at,
                  COALESCE(array_agg(r.name ORDER BY r.id) FILTER (WHERE r.id IS NOT NULL), '{{}}') AS roles
           FROM users u
           LEFT JOIN role_user ru ON ru.user_id = u.id
           LEFT JOIN roles r ON r.id = ru.role_id
           WHERE {}
           GROUP BY u.id"#,
        filter
    )
}

impl UserRepository for PostgresRepository {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = select_users("u.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = select_users("u.email = $1");
        let row = sqlx::query(&sql)
            .bind(email.as_ref())
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(self.pool())
            .await?;
        Ok(exists)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"INSERT INTO users (name, username, email, password, staged)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *, ARRAY[]::varchar[] AS roles"#,
        )
        .bind(user.name)
        .bind(user.username.into_inner())
        .bind(user.email.into_inner())
        .bind(user.password_hash)
        .bind(user.staged)
        .fetch_one(self.pool())
        .await?;
        Ok(User::try_from(row)?)
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE users
               SET name = $2, username = $3, email = $4, password = $5,
                   profile_metadata = $6, email_verified_at = $7, staged = $8,
                   updated_at = now()
               WHERE id = $1"#,
        )
        .bind(user.id.0)
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_metadata)
        .bind(user.email_verified_at)
        .bind(user.staged)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.find_user(user.id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn assign_global_role(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO role_user (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id.0)
            .bind(role.id())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

impl SessionRepository for PostgresRepository {
    async fn create_session(&self, token: &str, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id.0)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let user_id: Option<i64> = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(self.pool())
            .await?;
        Ok(user_id.map(UserId))
    }

    async fn delete_session(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
