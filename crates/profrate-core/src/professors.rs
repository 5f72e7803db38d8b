use serde::{Deserialize, Serialize};

/// Department recorded when the remote search result carries none.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// A professor returned by one page of the remote search, normalized but not
/// yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Opaque base64 identifier assigned by RateMyProfessors, e.g.
    /// `"VGVhY2hlci0xMjM0NQ=="`. Stable across runs; used as the upsert key.
    pub external_id: String,
    /// `"{firstName} {lastName}"`.
    pub display_name: String,
    pub department: String,
    /// Average rating on a 0–5 scale, when the remote system has one.
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
}

/// Manual edit of the fields the scraper never writes. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorPatch {
    pub department: Option<String>,
    pub course_label: Option<String>,
    pub average_grade: Option<String>,
}

impl ProfessorPatch {
    /// Returns `true` when no field would be changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.course_label.is_none() && self.average_grade.is_none()
    }
}
