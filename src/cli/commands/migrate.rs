use anyhow::Context;
use serde_json::json;

use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::PgStore;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    store.migrate().await.context("failed to apply migrations")?;
    store.close().await;

    output_success(
        output_format,
        "Migrations applied",
        json!({ "database": config.database.redacted_url() }),
    )
}
