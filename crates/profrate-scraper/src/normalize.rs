//! Normalization from raw search nodes to [`profrate_core::CandidateRecord`].

use profrate_core::{CandidateRecord, UNKNOWN_DEPARTMENT};

use crate::types::TeacherNode;

/// Flattens a [`TeacherNode`] into a [`CandidateRecord`].
///
/// The display name is `"{firstName} {lastName}"` trimmed, so an empty part
/// leaves no stray whitespace. An absent, null, or blank department becomes
/// [`UNKNOWN_DEPARTMENT`]. Ratings pass through unchanged; range checks happen
/// during reconciliation so a bad value only costs its own record.
#[must_use]
pub fn normalize_teacher(node: TeacherNode) -> CandidateRecord {
    let first = node.first_name.trim();
    let last = node.last_name.trim();
    let display_name = format!("{first} {last}").trim().to_string();

    let department = node
        .department
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string());

    CandidateRecord {
        external_id: node.id,
        display_name,
        department,
        rating: node.avg_rating,
        rating_count: node.num_ratings,
    }
}
