use crate::{
    domain::migration::Migration,
    infrastructure::{persistence::PersistenceAdapter, settings::Settings},
};
use folio_common::database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod domain;
pub mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let database = database::connect(&settings.database).await?;
    tracing::info!("Connected to DB");
    let persistence = PersistenceAdapter::new(database);

    // create every table of the catalogue that is missing
    let migration = Migration::new(persistence);
    migration.migrate().await?;
    tracing::info!("Schema migrated");

    Ok(())
}
