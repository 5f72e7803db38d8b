//! `scrape` command: one scrape run against Postgres or an in-memory store.

use profrate_core::{AppConfig, RunSummary};
use profrate_db::MemoryStore;
use profrate_scraper::{run_scrape, RateMyProfClient};

use crate::db::connect;

/// Runs a scrape, prints its summary as JSON, and fails when the summary
/// reports no success.
///
/// With `dry_run`, candidates are reconciled into a fresh [`MemoryStore`]
/// and the database is never opened.
pub(crate) async fn run(
    config: &AppConfig,
    school_id: i64,
    limit: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = RateMyProfClient::from_app_config(config)?;

    let summary = if dry_run {
        let store = MemoryStore::new();
        let summary = run_scrape(&client, &store, school_id, limit).await;
        tracing::info!(rows = store.len(), "dry run complete; nothing written to the database");
        summary
    } else {
        let pool = connect(config).await?;
        run_scrape(&client, &pool, school_id, limit).await
    };

    println!("{}", render_summary(&summary)?);
    ensure_success(&summary)
}

fn render_summary(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn ensure_success(summary: &RunSummary) -> anyhow::Result<()> {
    if summary.success {
        Ok(())
    } else {
        anyhow::bail!("scrape did not succeed: {}", summary.message)
    }
}
