//! Scrape-and-store run: fetch every page, reconcile, summarize.
//!
//! [`run_scrape`] is the only place where failures are turned into a
//! [`RunSummary`]; everything below it returns typed errors.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use profrate_core::RunSummary;
use profrate_db::{reconcile, ProfessorStore, ReconcileError};
use thiserror::Error;

use crate::client::RateMyProfClient;
use crate::error::ScraperError;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Fetch(#[from] ScraperError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

/// Fetches the professors of `school_id` (at most `limit`) and reconciles
/// them into `store`.
///
/// Never fails: an empty fetch yields [`RunSummary::no_professors_found`];
/// a fetch error, a fatal reconcile error, or a panic anywhere in the run
/// yields [`RunSummary::failed`] with nothing persisted.
pub async fn run_scrape<S>(
    client: &RateMyProfClient,
    store: &S,
    school_id: i64,
    limit: Option<usize>,
) -> RunSummary
where
    S: ProfessorStore,
{
    tracing::info!(school_id, ?limit, "starting scrape run");

    let run = AssertUnwindSafe(scrape_and_store(client, store, school_id, limit)).catch_unwind();

    match run.await {
        Ok(Ok(summary)) => {
            tracing::info!(
                school_id,
                processed = summary.processed_count,
                success = summary.success,
                "scrape run finished"
            );
            summary
        }
        Ok(Err(e)) => {
            tracing::error!(school_id, error = %e, "scrape run failed");
            RunSummary::failed(e)
        }
        Err(panic) => {
            let description = panic_description(panic.as_ref());
            tracing::error!(school_id, panic = %description, "scrape run panicked");
            RunSummary::failed(description)
        }
    }
}

async fn scrape_and_store<S>(
    client: &RateMyProfClient,
    store: &S,
    school_id: i64,
    limit: Option<usize>,
) -> Result<RunSummary, RunError>
where
    S: ProfessorStore,
{
    let candidates = client.fetch_all(school_id, limit).await?;
    if candidates.is_empty() {
        tracing::warn!(school_id, "remote search returned no professors");
        return Ok(RunSummary::no_professors_found());
    }

    let outcome = reconcile(store, &candidates).await?;
    Ok(RunSummary::completed(outcome.processed, outcome.errors))
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}
