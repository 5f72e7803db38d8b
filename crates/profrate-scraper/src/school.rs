//! RateMyProfessors relay-style school identifiers.
//!
//! The search API takes schools as standard base64 of `School-{id}`, so
//! school 1581 is sent as `U2Nob29sLTE1ODE=`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

const SCHOOL_PREFIX: &str = "School-";

/// Encodes a numeric school id into the opaque form the search API expects.
#[must_use]
pub fn encode_school_id(school_id: i64) -> String {
    STANDARD.encode(format!("{SCHOOL_PREFIX}{school_id}"))
}

/// Reverses [`encode_school_id`]. Returns `None` for anything that is not a
/// base64 `School-{id}` string.
#[must_use]
pub fn decode_school_id(encoded: &str) -> Option<i64> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix(SCHOOL_PREFIX)?.parse().ok()
}
