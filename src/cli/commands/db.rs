use std::path::PathBuf;

use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{Database, SeedData};
use crate::state::AppState;

async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    Database::connect(&config.database)
        .await
        .context("this command needs DATABASE_URL pointing at PostgreSQL")
}

pub async fn migrate(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let database = connect(config).await?;
    database.migrate().await?;
    database.close().await;

    output_success(output_format, "Migrations applied", None)
}

pub async fn seed(config: &AppConfig, dir: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let data = match &dir {
        Some(dir) => SeedData::from_dir(dir)?,
        None => SeedData::bundled()?,
    };

    let database = connect(config).await?;
    database.migrate().await?;

    let state = AppState::postgres(database.clone());
    let summary = data.load(&state).await?;
    database.close().await;

    output_success(
        output_format,
        &format!("Seeded {}", summary),
        Some(json!({
            "folders": summary.folders,
            "tags": summary.tags,
            "notes": summary.notes
        })),
    )
}
