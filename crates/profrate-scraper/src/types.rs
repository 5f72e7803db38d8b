//! Wire types for the RateMyProfessors `newSearch.teachers` GraphQL query.
//!
//! ## Observed response shape
//!
//! ```json
//! {"data": {"newSearch": {"teachers": {
//!     "edges": [{"node": {"id": "VGVhY2hlci0x", "firstName": "Ada", ...}}],
//!     "pageInfo": {"hasNextPage": true, "endCursor": "YXJyYXljb25uZWN0aW9uOjk5"}
//! }}}}
//! ```
//!
//! `id`, `edges`, and `pageInfo` are required; their absence is a parse
//! error. Every other node field is optional: unrated professors come back
//! with `avgRating`/`numRatings` of `0` or `null`, and `department` is
//! sometimes empty.

use profrate_core::CandidateRecord;
use serde::{Deserialize, Serialize};

/// POST body for one page of the teacher search.
#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'static str,
    pub variables: SearchVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct SearchVariables<'a> {
    pub query: SchoolFilter<'a>,
    pub first: usize,
    /// Cursor of the previous page. Omitted entirely on the first request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SchoolFilter<'a> {
    /// Base64 `School-{id}`; see [`crate::school::encode_school_id`].
    #[serde(rename = "schoolID")]
    pub school_id: &'a str,
}

/// Successful GraphQL payload. Top-level `errors` are checked before this is
/// deserialized.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub data: SearchData,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    #[serde(rename = "newSearch")]
    pub new_search: NewSearch,
}

#[derive(Debug, Deserialize)]
pub struct NewSearch {
    pub teachers: TeacherConnection,
}

#[derive(Debug, Deserialize)]
pub struct TeacherConnection {
    pub edges: Vec<TeacherEdge>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct TeacherEdge {
    pub node: TeacherNode,
}

/// A single professor as returned by the search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherNode {
    /// Relay node id, e.g. `VGVhY2hlci0xMjM0NQ==` (`Teacher-12345`).
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub num_ratings: Option<i64>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One normalized page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<CandidateRecord>,
    pub page_info: PageInfo,
}
