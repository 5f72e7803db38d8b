use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for school {school_id}: exceeded {max_pages} pages")]
    PaginationLimit { school_id: i64, max_pages: usize },
}

impl ScraperError {
    /// `true` when the remote answered but the body did not have the expected
    /// shape, as opposed to a transport, status, or GraphQL-level failure.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Deserialize { .. })
    }
}
