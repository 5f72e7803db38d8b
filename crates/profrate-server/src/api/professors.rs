//! Read and manual-edit handlers for stored professors.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use profrate_core::ProfessorPatch;
use profrate_db::ProfessorRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ProfessorListItem {
    id: i64,
    name: String,
    department: String,
    course_label: String,
    average_grade: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfessorDetail {
    id: i64,
    external_id: Option<String>,
    name: String,
    department: String,
    course_label: String,
    average_grade: Option<String>,
    rating: Option<f64>,
    rating_count: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfessorStatsData {
    total: i64,
    with_ratings: i64,
    from_remote: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateProfessorRequest {
    pub department: Option<String>,
    pub course_label: Option<String>,
    pub average_grade: Option<String>,
}

impl From<ProfessorRow> for ProfessorListItem {
    fn from(row: ProfessorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            department: row.department,
            course_label: row.course_label,
            average_grade: row.average_grade,
        }
    }
}

impl From<ProfessorRow> for ProfessorDetail {
    fn from(row: ProfessorRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            department: row.department,
            course_label: row.course_label,
            average_grade: row.average_grade,
            rating: row.rating,
            rating_count: row.rating_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn list_professors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProfessorListItem>>>, ApiError> {
    let rows = profrate_db::list_professors(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(ProfessorListItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_professor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProfessorDetail>>, ApiError> {
    let row = profrate_db::get_professor(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(ProfessorDetail::from(row), req_id.0)))
}

pub(super) async fn get_professor_by_external_id(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(external_id): Path<String>,
) -> Result<Json<ApiResponse<ProfessorDetail>>, ApiError> {
    let row = profrate_db::get_professor_by_external_id(&state.pool, &external_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no professor with external id '{external_id}'"),
            )
        })?;

    Ok(Json(ApiResponse::new(ProfessorDetail::from(row), req_id.0)))
}

pub(super) async fn professor_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ProfessorStatsData>>, ApiError> {
    let stats = profrate_db::professor_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = ProfessorStatsData {
        total: stats.total,
        with_ratings: stats.with_ratings,
        from_remote: stats.from_remote,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn update_professor(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProfessorRequest>,
) -> Result<Json<ApiResponse<ProfessorDetail>>, ApiError> {
    let patch = validate_update(&req_id.0, body)?;

    let row = profrate_db::update_professor_details(&state.pool, id, &patch)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(id, "professor details updated");
    Ok(Json(ApiResponse::new(ProfessorDetail::from(row), req_id.0)))
}

/// Turns a request body into a patch. `department` is trimmed and may not be
/// blank; at least one field must be present.
fn validate_update(req_id: &str, body: UpdateProfessorRequest) -> Result<ProfessorPatch, ApiError> {
    let department = match body.department {
        Some(department) if department.trim().is_empty() => {
            return Err(ApiError::new(
                req_id,
                "validation_error",
                "department must not be blank",
            ));
        }
        Some(department) => Some(department.trim().to_string()),
        None => None,
    };

    let patch = ProfessorPatch {
        department,
        course_label: body.course_label,
        average_grade: body.average_grade,
    };

    if patch.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "at least one of department, course_label, average_grade is required",
        ));
    }

    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_app;
    use crate::api::test_support::{body_json, empty_request, json_request, offline_state};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    fn request(
        department: Option<&str>,
        course_label: Option<&str>,
        average_grade: Option<&str>,
    ) -> UpdateProfessorRequest {
        UpdateProfessorRequest {
            department: department.map(str::to_string),
            course_label: course_label.map(str::to_string),
            average_grade: average_grade.map(str::to_string),
        }
    }

    #[test]
    fn validate_update_trims_department() {
        let patch = validate_update("req-1", request(Some("  Physics "), None, None))
            .expect("valid patch");
        assert_eq!(patch.department.as_deref(), Some("Physics"));
    }

    #[test]
    fn validate_update_rejects_blank_department() {
        let err = validate_update("req-1", request(Some("   "), Some("PHYS 4A"), None)).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
    }

    #[test]
    fn validate_update_rejects_empty_patch() {
        let err = validate_update("req-1", request(None, None, None)).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
    }

    #[test]
    fn validate_update_passes_other_fields_through() {
        let patch = validate_update("req-1", request(None, Some("CS 1A"), Some("B+")))
            .expect("valid patch");
        assert_eq!(patch.course_label.as_deref(), Some("CS 1A"));
        assert_eq!(patch.average_grade.as_deref(), Some("B+"));
        assert!(patch.department.is_none());
    }

    #[tokio::test]
    async fn patch_with_blank_department_is_rejected_before_storage() {
        let app = build_app(offline_state());

        let response = app
            .oneshot(json_request(
                "PATCH",
                "/api/v1/professors/7",
                &json!({"department": ""}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let app = build_app(offline_state());

        let response = app
            .oneshot(empty_request("GET", "/api/v1/professors/abc"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn detail_serializes_every_column() {
        let now = Utc::now();
        let detail = ProfessorDetail::from(ProfessorRow {
            id: 3,
            external_id: Some("VGVhY2hlci0z".to_string()),
            name: "Ada Lovelace".to_string(),
            department: "Mathematics".to_string(),
            course_label: String::new(),
            average_grade: None,
            rating: Some(4.5),
            rating_count: Some(12),
            created_at: now,
            updated_at: now,
        });

        let json = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(json["external_id"], "VGVhY2hlci0z");
        assert_eq!(json["rating_count"], 12);
        assert!(json["average_grade"].is_null());
    }

    // -------------------------------------------------------------------------
    // Route integration tests (with DB)
    // -------------------------------------------------------------------------

    /// Insert a hand-entered professor (no external id) and return its id.
    async fn seed_manual_professor(pool: &sqlx::PgPool, name: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO professors (name, department, course_label) \
             VALUES ($1, 'Physics', 'PHYS 4A') RETURNING id",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed_manual_professor failed")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_and_detail_return_stored_rows(pool: sqlx::PgPool) {
        let id = seed_manual_professor(&pool, "Grace Hopper").await;
        let app = build_app(crate::api::test_support::test_state(
            pool,
            "http://127.0.0.1:1/graphql",
        ));

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/v1/professors"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json["data"].as_array().expect("data array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Grace Hopper");
        assert_eq!(rows[0]["course_label"], "PHYS 4A");

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/v1/professors/{id}")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["data"]["external_id"].is_null());

        let response = app
            .oneshot(empty_request("GET", "/api/v1/professors/999999"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn patch_updates_manual_fields(pool: sqlx::PgPool) {
        let id = seed_manual_professor(&pool, "Grace Hopper").await;
        let app = build_app(crate::api::test_support::test_state(
            pool,
            "http://127.0.0.1:1/graphql",
        ));

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/professors/{id}"),
                &json!({"average_grade": "A-"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["average_grade"], "A-");
        assert_eq!(json["data"]["course_label"], "PHYS 4A");
        assert_eq!(json["data"]["department"], "Physics");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn scrape_then_lookup_by_external_id(pool: sqlx::PgPool) {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"newSearch": {"teachers": {
                    "edges": [{"node": {
                        "id": "VGVhY2hlci0x", "firstName": "Ada", "lastName": "Lovelace",
                        "avgRating": 4.9, "numRatings": 20, "department": null
                    }}],
                    "pageInfo": {"hasNextPage": false, "endCursor": null}
                }}}
            })))
            .mount(&server)
            .await;
        let app = build_app(crate::api::test_support::test_state(
            pool,
            &format!("{}/graphql", server.uri()),
        ));

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/v1/professors/scrape"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["message"], "Scraped and stored 1 professors");

        let response = app
            .clone()
            .oneshot(empty_request(
                "GET",
                "/api/v1/professors/external/VGVhY2hlci0x",
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["name"], "Ada Lovelace");
        assert_eq!(json["data"]["department"], "Unknown");
        assert_eq!(json["data"]["course_label"], "");

        let response = app
            .oneshot(empty_request("GET", "/api/v1/professors/stats"))
            .await
            .expect("response");
        let json = body_json(response).await;
        assert_eq!(json["data"]["total"], 1);
        assert_eq!(json["data"]["from_remote"], 1);
    }
}
