//! Upsert of scraped candidates keyed on the RateMyProfessors id.
//!
//! All writes for one run share a single session and are committed together.
//! Each candidate is bracketed by a savepoint, so a bad record is rolled back
//! and reported without aborting the rest of the batch.

use profrate_core::CandidateRecord;
use thiserror::Error;

use crate::store::{ProfessorStore, ReconcileSession};
use crate::DbError;

/// Fatal reconciliation failure. Nothing from the run was persisted.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to open storage session: {0}")]
    Begin(#[source] DbError),
    #[error("failed to commit scraped professors: {0}")]
    Commit(#[source] DbError),
}

/// Failure applying one candidate. Recorded and skipped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid candidate: {0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(#[from] DbError),
}

/// Whether a candidate matched an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted(i64),
    Updated(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Candidates applied without a per-record error.
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    /// One message per failed candidate, in input order.
    pub errors: Vec<String>,
}

/// Applies `candidates` to `store`, updating rows whose `external_id` matches
/// and inserting the rest.
///
/// Matched rows get `name`, `department`, `rating`, and `rating_count`
/// overwritten; `id`, `course_label`, and `average_grade` are left alone.
///
/// # Errors
///
/// Returns [`ReconcileError::Begin`] if the session cannot be opened and
/// [`ReconcileError::Commit`] if the final commit fails. Per-record failures
/// never surface here; they are collected in [`ReconcileOutcome::errors`].
pub async fn reconcile<S>(
    store: &S,
    candidates: &[CandidateRecord],
) -> Result<ReconcileOutcome, ReconcileError>
where
    S: ProfessorStore,
{
    let mut session = store.begin_session().await.map_err(ReconcileError::Begin)?;
    let mut outcome = ReconcileOutcome::default();

    for candidate in candidates {
        match apply_candidate(&mut session, candidate).await {
            Ok(action) => {
                outcome.processed += 1;
                match action {
                    UpsertAction::Inserted(id) => {
                        outcome.inserted += 1;
                        tracing::debug!(id, external_id = %candidate.external_id, "inserted professor");
                    }
                    UpsertAction::Updated(id) => {
                        outcome.updated += 1;
                        tracing::debug!(id, external_id = %candidate.external_id, "updated professor");
                    }
                }
            }
            Err(e) => {
                let message = format!(
                    "error processing professor {}: {e}",
                    display_key(candidate)
                );
                tracing::error!(external_id = %candidate.external_id, error = %e, "failed to reconcile professor");
                outcome.errors.push(message);
            }
        }
    }

    session.commit().await.map_err(ReconcileError::Commit)?;

    tracing::info!(
        processed = outcome.processed,
        inserted = outcome.inserted,
        updated = outcome.updated,
        failed = outcome.errors.len(),
        "reconciliation committed"
    );

    Ok(outcome)
}

async fn apply_candidate<T>(
    session: &mut T,
    candidate: &CandidateRecord,
) -> Result<UpsertAction, RecordError>
where
    T: ReconcileSession,
{
    validate_candidate(candidate)?;

    session.savepoint().await?;
    let result = match upsert(session, candidate).await {
        Ok(action) => session
            .release_savepoint()
            .await
            .map(|()| action)
            .map_err(RecordError::from),
        Err(e) => Err(e),
    };

    if result.is_err() {
        if let Err(rollback) = session.rollback_to_savepoint().await {
            tracing::warn!(error = %rollback, "rollback to savepoint failed");
        }
    }
    result
}

async fn upsert<T>(session: &mut T, candidate: &CandidateRecord) -> Result<UpsertAction, RecordError>
where
    T: ReconcileSession,
{
    if let Some(id) = session.find_by_external_id(&candidate.external_id).await? {
        session.update_scraped(id, candidate).await?;
        Ok(UpsertAction::Updated(id))
    } else {
        let id = session.insert_scraped(candidate).await?;
        Ok(UpsertAction::Inserted(id))
    }
}

/// Rejects candidates that cannot be stored faithfully.
fn validate_candidate(candidate: &CandidateRecord) -> Result<(), RecordError> {
    if candidate.external_id.trim().is_empty() {
        return Err(RecordError::Invalid("missing external id".to_string()));
    }
    if candidate.display_name.trim().is_empty() {
        return Err(RecordError::Invalid("missing name".to_string()));
    }
    if candidate.department.trim().is_empty() {
        return Err(RecordError::Invalid("missing department".to_string()));
    }
    if let Some(rating) = candidate.rating {
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(RecordError::Invalid(format!(
                "rating {rating} is outside 0-5"
            )));
        }
    }
    if let Some(count) = candidate.rating_count {
        if count < 0 {
            return Err(RecordError::Invalid(format!(
                "rating count {count} is negative"
            )));
        }
    }
    Ok(())
}

fn display_key(candidate: &CandidateRecord) -> &str {
    if candidate.external_id.trim().is_empty() {
        candidate.display_name.as_str()
    } else {
        candidate.external_id.as_str()
    }
}
