use std::fs::create_dir_all;

use anyhow::Context;
use trivia_api::configuration::get_configuration;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::run_server;
use trivia_api::store::SqliteStore;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = get_configuration().context("Failed to read configuration")?;

    if let Some(static_dir) = &settings.application.static_dir {
        if !static_dir.exists() {
            create_dir_all(static_dir).context("Failed to create directory for static content")?;
        }
        if !static_dir.is_dir() {
            anyhow::bail!("static_dir should be a directory or not exist");
        }
    }

    let pool = establish_connection(&settings.database)
        .await
        .with_context(|| format!("Cannot connect to DB at {}", settings.database.path))?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await?;

    run_server(settings, SqliteStore::new(pool)).await
}
