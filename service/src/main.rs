use folio_common::connect_to_database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::notifications::{ChannelNotifier, spawn_dispatcher};
use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::persistence::PostgresRepository;
use crate::infrastructure::settings::Settings;

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::info!("configuration loaded");

    let database = connect_to_database(&settings.database).await?;
    tracing::info!("connected to database");

    let repository = PostgresRepository::new(database);
    let (notifier, events) = ChannelNotifier::new();
    spawn_dispatcher(repository.clone(), events);

    let state = AppStateImpl::new(repository, notifier, settings.verification());

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
