//! Live integration tests for profrate-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness from `DATABASE_URL`.

use profrate_core::{CandidateRecord, ProfessorPatch};
use profrate_db::{
    get_professor, get_professor_by_external_id, list_professors, professor_stats, reconcile,
    update_professor_details, DbError, ProfessorStore, ReconcileSession,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a row the way the manual path does (no external id) and return its `id`.
async fn insert_manual_professor(pool: &sqlx::PgPool, name: &str, course_label: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO professors (name, department, course_label, average_grade) \
         VALUES ($1, 'Physics', $2, 'A') RETURNING id",
    )
    .bind(name)
    .bind(course_label)
    .fetch_one(pool)
    .await
    .unwrap_or_else(|e| panic!("insert_manual_professor failed for '{name}': {e}"))
}

fn candidate(external_id: &str, name: &str, rating: Option<f64>) -> CandidateRecord {
    CandidateRecord {
        external_id: external_id.to_string(),
        display_name: name.to_string(),
        department: "Mathematics".to_string(),
        rating,
        rating_count: rating.map(|_| 12),
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_inserts_then_updates_in_place(pool: sqlx::PgPool) {
    let first = vec![
        candidate("VGVhY2hlci0x", "Ada Lovelace", Some(4.8)),
        candidate("VGVhY2hlci0y", "Alan Turing", None),
    ];
    let outcome = reconcile(&pool, &first).await.expect("first run");
    assert_eq!(outcome.inserted, 2);

    let original = get_professor_by_external_id(&pool, "VGVhY2hlci0x")
        .await
        .expect("lookup")
        .expect("row exists");
    assert_eq!(original.course_label, "");
    assert!(original.average_grade.is_none());

    update_professor_details(
        &pool,
        original.id,
        &ProfessorPatch {
            course_label: Some("MATH 1A".to_string()),
            ..ProfessorPatch::default()
        },
    )
    .await
    .expect("manual edit");

    let second = vec![candidate("VGVhY2hlci0x", "Ada King", Some(4.5))];
    let outcome = reconcile(&pool, &second).await.expect("second run");
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.inserted, 0);

    let row = get_professor(&pool, original.id).await.expect("row");
    assert_eq!(row.name, "Ada King");
    assert_eq!(row.rating, Some(4.5));
    assert_eq!(row.course_label, "MATH 1A");
    assert_eq!(list_professors(&pool).await.expect("list").len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn reconcile_twice_is_idempotent(pool: sqlx::PgPool) {
    let candidates: Vec<_> = (1..=20)
        .map(|n| candidate(&format!("ext-{n}"), &format!("Professor {n}"), Some(3.0)))
        .collect();

    let first = reconcile(&pool, &candidates).await.expect("first run");
    let second = reconcile(&pool, &candidates).await.expect("second run");

    assert_eq!(first.processed, 20);
    assert_eq!(second.processed, 20);
    let stats = professor_stats(&pool).await.expect("stats");
    assert_eq!(stats.total, 20);
    assert_eq!(stats.from_remote, 20);
}

#[sqlx::test(migrations = "../../migrations")]
async fn invalid_record_is_skipped_and_rest_committed(pool: sqlx::PgPool) {
    let mut candidates: Vec<_> = (1..=10)
        .map(|n| candidate(&format!("ext-{n}"), &format!("Professor {n}"), Some(4.0)))
        .collect();
    candidates[3].rating_count = Some(-5);

    let outcome = reconcile(&pool, &candidates).await.expect("reconcile");

    assert_eq!(outcome.processed, 9);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(list_professors(&pool).await.expect("list").len(), 9);
}

#[sqlx::test(migrations = "../../migrations")]
async fn savepoint_rollback_keeps_transaction_usable(pool: sqlx::PgPool) {
    let mut session = pool.begin_session().await.expect("session");
    session
        .insert_scraped(&candidate("ext-1", "Ada Lovelace", None))
        .await
        .expect("insert");

    session.savepoint().await.expect("savepoint");
    let duplicate = session
        .insert_scraped(&candidate("ext-1", "Ada Again", None))
        .await;
    assert!(duplicate.is_err(), "unique external_id must be enforced");
    session.rollback_to_savepoint().await.expect("rollback");

    session
        .insert_scraped(&candidate("ext-2", "Alan Turing", None))
        .await
        .expect("insert after rollback");
    session.commit().await.expect("commit");

    assert_eq!(list_professors(&pool).await.expect("list").len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn dropped_session_rolls_back(pool: sqlx::PgPool) {
    {
        let mut session = pool.begin_session().await.expect("session");
        session
            .insert_scraped(&candidate("ext-1", "Ada Lovelace", None))
            .await
            .expect("insert");
    }

    assert!(list_professors(&pool).await.expect("list").is_empty());
}

// ---------------------------------------------------------------------------
// Read and manual-edit path
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn manual_rows_coexist_without_external_id(pool: sqlx::PgPool) {
    insert_manual_professor(&pool, "Grace Hopper", "CS 1A").await;
    insert_manual_professor(&pool, "Edsger Dijkstra", "CS 2A").await;
    reconcile(&pool, &[candidate("ext-1", "Ada Lovelace", Some(4.9))])
        .await
        .expect("reconcile");

    let stats = professor_stats(&pool).await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.with_ratings, 1);
    assert_eq!(stats.from_remote, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_professor_details_applies_only_present_fields(pool: sqlx::PgPool) {
    let id = insert_manual_professor(&pool, "Grace Hopper", "CS 1A").await;

    let row = update_professor_details(
        &pool,
        id,
        &ProfessorPatch {
            average_grade: Some("B".to_string()),
            ..ProfessorPatch::default()
        },
    )
    .await
    .expect("update");

    assert_eq!(row.average_grade.as_deref(), Some("B"));
    assert_eq!(row.course_label, "CS 1A");
    assert_eq!(row.department, "Physics");
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_rows_report_not_found(pool: sqlx::PgPool) {
    assert!(matches!(
        get_professor(&pool, 9_999).await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        update_professor_details(&pool, 9_999, &ProfessorPatch::default()).await,
        Err(DbError::NotFound)
    ));
    assert!(get_professor_by_external_id(&pool, "nope")
        .await
        .expect("lookup")
        .is_none());
}
