//! Read and manual-edit operations for the `professors` table.
//!
//! Scrape-driven writes go through [`crate::reconcile`] instead.

use chrono::{DateTime, Utc};
use profrate_core::ProfessorPatch;
use sqlx::PgPool;

use crate::DbError;

pub(crate) const PROFESSOR_COLUMNS: &str = "id, external_id, name, department, course_label, \
     average_grade, rating, rating_count, created_at, updated_at";

/// A row from the `professors` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProfessorRow {
    pub id: i64,
    /// RateMyProfessors node id. `NULL` for rows entered by hand that were
    /// never matched to a search result.
    pub external_id: Option<String>,
    pub name: String,
    pub department: String,
    /// `NOT NULL DEFAULT ''`; only written by the manual edit path.
    pub course_label: String,
    pub average_grade: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts over the `professors` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfessorStats {
    pub total: i64,
    pub with_ratings: i64,
    pub from_remote: i64,
}

/// Returns every professor ordered by `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_professors(pool: &PgPool) -> Result<Vec<ProfessorRow>, DbError> {
    let rows = sqlx::query_as::<_, ProfessorRow>(&format!(
        "SELECT {PROFESSOR_COLUMNS} FROM professors ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single professor by internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_professor(pool: &PgPool, id: i64) -> Result<ProfessorRow, DbError> {
    sqlx::query_as::<_, ProfessorRow>(&format!(
        "SELECT {PROFESSOR_COLUMNS} FROM professors WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Fetches a professor by RateMyProfessors id, if one has been stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_professor_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<ProfessorRow>, DbError> {
    let row = sqlx::query_as::<_, ProfessorRow>(&format!(
        "SELECT {PROFESSOR_COLUMNS} FROM professors WHERE external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Counts all professors, those with a rating, and those matched to a remote id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn professor_stats(pool: &PgPool) -> Result<ProfessorStats, DbError> {
    let stats = sqlx::query_as::<_, ProfessorStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(rating) AS with_ratings, \
                COUNT(external_id) AS from_remote \
         FROM professors",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Applies a manual edit of `department`, `course_label`, and `average_grade`.
///
/// Fields absent from `patch` keep their current value. The scraper-owned
/// columns (`external_id`, `name`, `rating`, `rating_count`) are never touched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_professor_details(
    pool: &PgPool,
    id: i64,
    patch: &ProfessorPatch,
) -> Result<ProfessorRow, DbError> {
    sqlx::query_as::<_, ProfessorRow>(&format!(
        "UPDATE professors \
         SET department    = COALESCE($2, department), \
             course_label  = COALESCE($3, course_label), \
             average_grade = COALESCE($4, average_grade), \
             updated_at    = NOW() \
         WHERE id = $1 \
         RETURNING {PROFESSOR_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.department.as_deref())
    .bind(patch.course_label.as_deref())
    .bind(patch.average_grade.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
