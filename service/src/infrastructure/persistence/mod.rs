use folio_common::database::Database;
use sqlx::{PgPool, postgres::PgRow};

use crate::domain::repository::RepositoryError;

mod comments;
mod notifications;
mod publications;
mod rows;
mod submissions;
mod users;

/// Every repository of the service backed by the shared PostgreSQL pool.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    database: &'static Database,
}

impl PostgresRepository {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn pool(&self) -> &PgPool {
        self.database.database_pool()
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                RepositoryError::UniqueViolation(e.constraint().unwrap_or(e.message()).to_string())
            }
            sqlx::Error::Database(e) if e.is_foreign_key_violation() => {
                RepositoryError::ValidationFailed(e.message().to_string())
            }
            _ => RepositoryError::DatabaseError(error.to_string()),
        }
    }
}

fn rows_into<T>(rows: Vec<PgRow>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<PgRow, Error = sqlx::Error>,
{
    rows.into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RepositoryError::from)
}

fn row_into<T>(row: Option<PgRow>) -> Result<Option<T>, RepositoryError>
where
    T: TryFrom<PgRow, Error = sqlx::Error>,
{
    row.map(T::try_from).transpose().map_err(RepositoryError::from)
}
