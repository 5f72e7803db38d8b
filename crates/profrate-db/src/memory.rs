//! In-process [`ProfessorStore`] used for dry runs and tests.
//!
//! Sessions work on a private copy of the table and swap it in on commit, so
//! the all-or-nothing behavior matches the Postgres store.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use profrate_core::{CandidateRecord, ProfessorPatch};

use crate::professors::ProfessorRow;
use crate::store::{ProfessorStore, ReconcileSession};
use crate::DbError;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<ProfessorRow>,
    next_id: i64,
}

impl Table {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
struct Shared {
    table: Table,
    fail_commit: bool,
}

/// Thread-safe in-memory `professors` table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later commit fail with [`DbError::Rejected`].
    pub fn fail_commits(&self) {
        self.lock().fail_commit = true;
    }

    /// Inserts a row as the manual path would: no external id, a course label,
    /// and an optional grade. Returns the assigned id.
    pub fn insert_manual(
        &self,
        name: &str,
        department: &str,
        course_label: &str,
        average_grade: Option<&str>,
    ) -> i64 {
        let mut shared = self.lock();
        let id = shared.table.allocate_id();
        let now = Utc::now();
        shared.table.rows.push(ProfessorRow {
            id,
            external_id: None,
            name: name.to_string(),
            department: department.to_string(),
            course_label: course_label.to_string(),
            average_grade: average_grade.map(str::to_string),
            rating: None,
            rating_count: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Applies a manual edit the same way `update_professor_details` does.
    /// Returns `None` when no row has the given id.
    pub fn apply_patch(&self, id: i64, patch: &ProfessorPatch) -> Option<ProfessorRow> {
        let mut shared = self.lock();
        let row = shared.table.rows.iter_mut().find(|row| row.id == id)?;
        if let Some(department) = &patch.department {
            row.department.clone_from(department);
        }
        if let Some(course_label) = &patch.course_label {
            row.course_label.clone_from(course_label);
        }
        if let Some(average_grade) = &patch.average_grade {
            row.average_grade = Some(average_grade.clone());
        }
        row.updated_at = Utc::now();
        Some(row.clone())
    }

    /// Returns a snapshot of all committed rows ordered by id.
    #[must_use]
    pub fn rows(&self) -> Vec<ProfessorRow> {
        self.lock().table.rows.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().table.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn find_by_external_id(&self, external_id: &str) -> Option<ProfessorRow> {
        self.lock()
            .table
            .rows
            .iter()
            .find(|row| row.external_id.as_deref() == Some(external_id))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Uncommitted working copy of a [`MemoryStore`] table.
#[derive(Debug)]
pub struct MemorySession {
    store: MemoryStore,
    rows: Vec<ProfessorRow>,
    next_id: i64,
    savepoint: Option<(Vec<ProfessorRow>, i64)>,
}

impl ProfessorStore for MemoryStore {
    type Session = MemorySession;

    async fn begin_session(&self) -> Result<MemorySession, DbError> {
        let shared = self.lock();
        Ok(MemorySession {
            store: self.clone(),
            rows: shared.table.rows.clone(),
            next_id: shared.table.next_id,
            savepoint: None,
        })
    }
}

impl ReconcileSession for MemorySession {
    async fn find_by_external_id(&mut self, external_id: &str) -> Result<Option<i64>, DbError> {
        Ok(self
            .rows
            .iter()
            .find(|row| row.external_id.as_deref() == Some(external_id))
            .map(|row| row.id))
    }

    async fn update_scraped(&mut self, id: i64, candidate: &CandidateRecord) -> Result<(), DbError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(DbError::NotFound)?;

        row.name.clone_from(&candidate.display_name);
        row.department.clone_from(&candidate.department);
        row.rating = candidate.rating;
        row.rating_count = candidate.rating_count;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_scraped(&mut self, candidate: &CandidateRecord) -> Result<i64, DbError> {
        if self
            .rows
            .iter()
            .any(|row| row.external_id.as_deref() == Some(candidate.external_id.as_str()))
        {
            return Err(DbError::Rejected(format!(
                "duplicate external_id {}",
                candidate.external_id
            )));
        }

        self.next_id += 1;
        let now = Utc::now();
        self.rows.push(ProfessorRow {
            id: self.next_id,
            external_id: Some(candidate.external_id.clone()),
            name: candidate.display_name.clone(),
            department: candidate.department.clone(),
            course_label: String::new(),
            average_grade: None,
            rating: candidate.rating,
            rating_count: candidate.rating_count,
            created_at: now,
            updated_at: now,
        });
        Ok(self.next_id)
    }

    async fn savepoint(&mut self) -> Result<(), DbError> {
        self.savepoint = Some((self.rows.clone(), self.next_id));
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), DbError> {
        self.savepoint
            .take()
            .map(|_| ())
            .ok_or_else(|| DbError::Rejected("no active savepoint".to_string()))
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), DbError> {
        let (rows, next_id) = self
            .savepoint
            .take()
            .ok_or_else(|| DbError::Rejected("no active savepoint".to_string()))?;
        self.rows = rows;
        self.next_id = next_id;
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        let mut shared = self.store.lock();
        if shared.fail_commit {
            return Err(DbError::Rejected("commit refused".to_string()));
        }
        shared.table = Table {
            rows: self.rows,
            next_id: self.next_id,
        };
        Ok(())
    }
}
