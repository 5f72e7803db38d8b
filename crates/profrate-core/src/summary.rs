//! Outcome of one scrape-and-store invocation.

use serde::{Deserialize, Serialize};

/// Structured result returned for every scrape run, successful or not.
///
/// `success` is `false` only when nothing was stored: no professors were
/// found, or a fetch or commit failure aborted the run. Per-record failures
/// leave it `true` and are listed in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub success: bool,
    pub processed_count: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl RunSummary {
    /// The remote search returned no professors for the school.
    #[must_use]
    pub fn no_professors_found() -> Self {
        Self {
            success: false,
            processed_count: 0,
            message: "No professors found".to_string(),
            errors: None,
        }
    }

    #[must_use]
    pub fn completed(processed_count: usize, errors: Vec<String>) -> Self {
        let mut message = format!("Scraped and stored {processed_count} professors");
        if !errors.is_empty() {
            message.push_str(&format!(" ({} errors)", errors.len()));
        }

        Self {
            success: true,
            processed_count,
            message,
            errors: if errors.is_empty() {
                None
            } else {
                Some(errors)
            },
        }
    }

    /// A fatal pipeline failure. Nothing from the run was persisted.
    #[must_use]
    pub fn failed(description: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            processed_count: 0,
            message: format!("Scraping failed: {description}"),
            errors: None,
        }
    }
}
