//! Storage handle consumed by the reconciliation engine.
//!
//! A [`ProfessorStore`] opens one [`ReconcileSession`] per scrape run. Every
//! write in the session becomes visible only after [`ReconcileSession::commit`];
//! dropping a session without committing discards its writes.

use std::future::Future;

use profrate_core::CandidateRecord;
use sqlx::{PgPool, Postgres, Transaction};

use crate::DbError;

/// Something that can open a transactional reconciliation session.
pub trait ProfessorStore: Send + Sync {
    type Session: ReconcileSession;

    /// Acquires a connection and starts a transaction.
    fn begin_session(&self) -> impl Future<Output = Result<Self::Session, DbError>> + Send;
}

/// One all-or-nothing unit of scrape writes.
///
/// The savepoint methods bracket a single candidate so a failed statement can
/// be undone without poisoning the rest of the transaction.
pub trait ReconcileSession: Send {
    /// Returns the internal id of the row holding `external_id`, if any.
    fn find_by_external_id(
        &mut self,
        external_id: &str,
    ) -> impl Future<Output = Result<Option<i64>, DbError>> + Send;

    /// Overwrites `name`, `department`, `rating`, and `rating_count` of row `id`.
    fn update_scraped(
        &mut self,
        id: i64,
        candidate: &CandidateRecord,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Inserts a new row for `candidate` and returns its id. `course_label`
    /// starts empty and `average_grade` unset.
    fn insert_scraped(
        &mut self,
        candidate: &CandidateRecord,
    ) -> impl Future<Output = Result<i64, DbError>> + Send;

    fn savepoint(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn release_savepoint(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn rollback_to_savepoint(&mut self) -> impl Future<Output = Result<(), DbError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), DbError>> + Send;
}

const SAVEPOINT: &str = "reconcile_record";

/// Postgres session backed by a single pool transaction.
///
/// The transaction rolls back when dropped uncommitted, which releases the
/// connection on every exit path.
pub struct PgReconcileSession {
    tx: Transaction<'static, Postgres>,
}

impl ProfessorStore for PgPool {
    type Session = PgReconcileSession;

    async fn begin_session(&self) -> Result<PgReconcileSession, DbError> {
        let tx = self.begin().await?;
        Ok(PgReconcileSession { tx })
    }
}

impl ReconcileSession for PgReconcileSession {
    async fn find_by_external_id(&mut self, external_id: &str) -> Result<Option<i64>, DbError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM professors WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(id)
    }

    async fn update_scraped(&mut self, id: i64, candidate: &CandidateRecord) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE professors \
             SET name         = $2, \
                 department   = $3, \
                 rating       = $4, \
                 rating_count = $5, \
                 updated_at   = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&candidate.display_name)
        .bind(&candidate.department)
        .bind(candidate.rating)
        .bind(candidate.rating_count)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn insert_scraped(&mut self, candidate: &CandidateRecord) -> Result<i64, DbError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO professors \
                 (external_id, name, department, course_label, average_grade, rating, rating_count) \
             VALUES ($1, $2, $3, '', NULL, $4, $5) \
             RETURNING id",
        )
        .bind(&candidate.external_id)
        .bind(&candidate.display_name)
        .bind(&candidate.department)
        .bind(candidate.rating)
        .bind(candidate.rating_count)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(id)
    }

    async fn savepoint(&mut self) -> Result<(), DbError> {
        sqlx::query(&format!("SAVEPOINT {SAVEPOINT}"))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), DbError> {
        sqlx::query(&format!("RELEASE SAVEPOINT {SAVEPOINT}"))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), DbError> {
        sqlx::query(&format!("ROLLBACK TO SAVEPOINT {SAVEPOINT}"))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }
}
