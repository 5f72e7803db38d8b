//! HTTP client for the RateMyProfessors GraphQL teacher search.

mod fetch_all;

use std::time::Duration;

use profrate_core::config::DEFAULT_GRAPHQL_URL;
use profrate_core::AppConfig;
use reqwest::Client;

use crate::error::ScraperError;
use crate::normalize::normalize_teacher;
use crate::types::{Page, SchoolFilter, SearchRequest, SearchResponse, SearchVariables};

/// Results requested per page. The search rejects anything above 100.
pub const PAGE_SIZE: usize = 100;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on a cursor that never advances.
pub const MAX_PAGES: usize = 500;

pub(crate) const SEARCH_TEACHERS_QUERY: &str = r"query newSearch($query: TeacherSearchQuery, $first: Int, $after: String) {
  newSearch {
    teachers(query: $query, first: $first, after: $after) {
      edges {
        node {
          id
          firstName
          lastName
          avgRating
          numRatings
          department
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}";

/// Client for the `newSearch.teachers` query.
///
/// Use [`RateMyProfClient::new`] for the public endpoint or
/// [`RateMyProfClient::with_endpoint`] to point at a mock server in tests.
/// Requests are never retried; a failed page aborts the fetch.
#[derive(Debug, Clone)]
pub struct RateMyProfClient {
    client: Client,
    endpoint: String,
}

impl RateMyProfClient {
    /// Creates a client for the public RateMyProfessors endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        Self::with_endpoint(DEFAULT_GRAPHQL_URL, timeout_secs, user_agent)
    }

    /// Creates a client from the endpoint, timeout, and user agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::with_endpoint(
            &config.graphql_url,
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
        )
    }

    /// Creates a client that posts to `endpoint` instead of the public API.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_endpoint(
        endpoint: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches and normalizes one page of teachers for an encoded school id.
    ///
    /// `after` is the previous page's `endCursor`; pass `None` for the first
    /// page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`] on network failure or timeout.
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::GraphQl`] if the body carries a non-empty `errors` list.
    /// - [`ScraperError::Deserialize`] if the body is not JSON or lacks
    ///   `data.newSearch.teachers`, its `edges`/`pageInfo`, or a node `id`.
    pub async fn fetch_page(
        &self,
        encoded_school_id: &str,
        after: Option<&str>,
    ) -> Result<Page, ScraperError> {
        let request = search_request(encoded_school_id, after);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
                context: format!("teacher search response from {}", self.endpoint),
                source: e,
            })?;
        check_graphql_errors(&value)?;

        let parsed: SearchResponse =
            serde_json::from_value(value).map_err(|e| ScraperError::Deserialize {
                context: format!("newSearch.teachers (after={after:?})"),
                source: e,
            })?;

        let connection = parsed.data.new_search.teachers;
        let records = connection
            .edges
            .into_iter()
            .map(|edge| normalize_teacher(edge.node))
            .collect();

        Ok(Page {
            records,
            page_info: connection.page_info,
        })
    }
}

fn search_request<'a>(encoded_school_id: &'a str, after: Option<&'a str>) -> SearchRequest<'a> {
    SearchRequest {
        query: SEARCH_TEACHERS_QUERY,
        variables: SearchVariables {
            query: SchoolFilter {
                school_id: encoded_school_id,
            },
            first: PAGE_SIZE,
            after,
        },
    }
}

/// Fails on a populated top-level `errors` list, surfacing the first message.
fn check_graphql_errors(body: &serde_json::Value) -> Result<(), ScraperError> {
    let Some(errors) = body.get("errors").and_then(serde_json::Value::as_array) else {
        return Ok(());
    };

    match errors.first() {
        None => Ok(()),
        Some(first) => {
            let message = first
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            Err(ScraperError::GraphQl { message })
        }
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
