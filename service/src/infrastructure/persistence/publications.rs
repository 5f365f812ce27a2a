use folio_common::{PublicationId, Role, StyleCriteriaId, UserId};

use super::{PostgresRepository, row_into, rows_into};
use crate::domain::{
    RoleAssignment,
    publications::{NewPublication, NewStyleCriteria, Publication, StyleCriteria},
    repository::{PublicationRepository, RepositoryError},
};

impl PublicationRepository for PostgresRepository {
    async fn insert_publication(&self, publication: NewPublication) -> Result<Publication, RepositoryError> {
        let row = sqlx::query(
            r#"INSERT INTO publications (name, is_publicly_visible, is_accepting_submissions)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(publication.name.into_inner())
        .bind(publication.is_publicly_visible)
        .bind(publication.is_accepting_submissions)
        .fetch_one(self.pool())
        .await?;
        Ok(Publication::try_from(row)?)
    }

    async fn find_publication(&self, id: PublicationId) -> Result<Option<Publication>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM publications WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn list_publications(&self, only_publicly_visible: bool) -> Result<Vec<Publication>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM publications WHERE NOT $1 OR is_publicly_visible ORDER BY name",
        )
        .bind(only_publicly_visible)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn publication_roles(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
    ) -> Result<Vec<Role>, RepositoryError> {
        let ids: Vec<i16> = sqlx::query_scalar(
            "SELECT role_id FROM publication_user WHERE publication_id = $1 AND user_id = $2 ORDER BY id",
        )
        .bind(publication_id.0)
        .bind(user_id.0)
        .fetch_all(self.pool())
        .await?;

        ids.into_iter()
            .map(|id| Role::try_from(id).map_err(|e| RepositoryError::DatabaseError(e.to_string())))
            .collect()
    }

    async fn publication_users(&self, publication_id: PublicationId) -> Result<Vec<RoleAssignment>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, role_id, created_at FROM publication_user
               WHERE publication_id = $1 ORDER BY id"#,
        )
        .bind(publication_id.0)
        .fetch_all(self.pool())
        .await?;
        rows_into(rows)
    }

    async fn attach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO publication_user (publication_id, user_id, role_id) VALUES ($1, $2, $3)")
            .bind(publication_id.0)
            .bind(user_id.0)
            .bind(role.id())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn detach_publication_user(
        &self,
        publication_id: PublicationId,
        user_id: UserId,
        role: Role,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM publication_user WHERE publication_id = $1 AND user_id = $2 AND role_id = $3",
        )
        .bind(publication_id.0)
        .bind(user_id.0)
        .bind(role.id())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn style_criteria(&self, publication_id: PublicationId) -> Result<Vec<StyleCriteria>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM style_criterias WHERE publication_id = $1 ORDER BY id")
            .bind(publication_id.0)
            .fetch_all(self.pool())
            .await?;
        rows_into(rows)
    }

    async fn find_style_criteria(&self, id: StyleCriteriaId) -> Result<Option<StyleCriteria>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM style_criterias WHERE id = $1")
            .bind(id.0)
            .fetch_optional(self.pool())
            .await?;
        row_into(row)
    }

    async fn insert_style_criteria(&self, criteria: NewStyleCriteria) -> Result<StyleCriteria, RepositoryError> {
        let row = sqlx::query(
            r#"INSERT INTO style_criterias (publication_id, name, description, icon)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(criteria.publication_id.0)
        .bind(criteria.name.into_inner())
        .bind(criteria.description)
        .bind(criteria.icon)
        .fetch_one(self.pool())
        .await?;
        Ok(StyleCriteria::try_from(row)?)
    }

    async fn update_style_criteria(&self, criteria: &StyleCriteria) -> Result<StyleCriteria, RepositoryError> {
        let row = sqlx::query(
            r#"UPDATE style_criterias
               SET name = $2, description = $3, icon = $4, updated_at = now()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(criteria.id.0)
        .bind(&criteria.name)
        .bind(&criteria.description)
        .bind(&criteria.icon)
        .fetch_optional(self.pool())
        .await?;
        row_into(row)?.ok_or(RepositoryError::NotFound)
    }

    async fn delete_style_criteria(&self, id: StyleCriteriaId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM style_criterias WHERE id = $1")
            .bind(id.0)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
