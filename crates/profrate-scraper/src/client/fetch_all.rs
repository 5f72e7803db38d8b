//! Multi-page fetch for `RateMyProfClient`.

use std::pin::pin;

use futures::stream::{self, Stream, TryStreamExt};
use profrate_core::CandidateRecord;

use crate::error::ScraperError;
use crate::school::encode_school_id;
use crate::types::Page;

use super::{RateMyProfClient, MAX_PAGES};

/// Where the next page request starts.
enum Cursor {
    First,
    After(String),
    Exhausted,
}

impl RateMyProfClient {
    /// Lazily pages through every teacher of `school_id`.
    ///
    /// Each poll issues at most one request, following `endCursor` from the
    /// previous page. The stream ends after a page with no edges, after a page
    /// reporting `hasNextPage == false`, or when a page claims more results
    /// but carries no cursor. It yields an error and ends on any failed page.
    ///
    /// The stream is single-pass: dropping it stops pagination and a new call
    /// starts again from the first page.
    pub fn candidate_pages(
        &self,
        school_id: i64,
    ) -> impl Stream<Item = Result<Page, ScraperError>> + Send + '_ {
        let encoded = encode_school_id(school_id);

        stream::try_unfold((Cursor::First, 0usize), move |(cursor, fetched_pages)| {
            let encoded = encoded.clone();
            async move {
                let after = match cursor {
                    Cursor::Exhausted => return Ok(None),
                    Cursor::First => None,
                    Cursor::After(after) => Some(after),
                };

                let page_number = fetched_pages + 1;
                if page_number > MAX_PAGES {
                    return Err(ScraperError::PaginationLimit {
                        school_id,
                        max_pages: MAX_PAGES,
                    });
                }

                let page = self.fetch_page(&encoded, after.as_deref()).await?;
                tracing::info!(
                    school_id,
                    page = page_number,
                    fetched = page.records.len(),
                    "fetched teacher page"
                );

                if page.records.is_empty() {
                    return Ok(None);
                }

                let next = match (page.page_info.has_next_page, &page.page_info.end_cursor) {
                    (false, _) => Cursor::Exhausted,
                    (true, Some(end_cursor)) => Cursor::After(end_cursor.clone()),
                    (true, None) => {
                        tracing::warn!(
                            school_id,
                            page = page_number,
                            "hasNextPage without endCursor; stopping"
                        );
                        Cursor::Exhausted
                    }
                };

                Ok(Some((page, (next, page_number))))
            }
        })
    }

    /// Fetches every teacher of `school_id`, or the first `limit` of them.
    ///
    /// Records keep their arrival order. Once `limit` records are in hand the
    /// result is truncated to exactly `limit` and no further page is
    /// requested. `Some(0)` returns immediately without a request.
    ///
    /// **All-or-nothing**: if any page fails, records from earlier pages are
    /// discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    /// Returns [`ScraperError::PaginationLimit`] if the number of pages exceeds
    /// [`MAX_PAGES`].
    pub async fn fetch_all(
        &self,
        school_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<CandidateRecord>, ScraperError> {
        if limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut pages = pin!(self.candidate_pages(school_id));
        let mut records: Vec<CandidateRecord> = Vec::new();

        while let Some(page) = pages.try_next().await? {
            records.extend(page.records);

            if let Some(limit) = limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    tracing::info!(school_id, limit, "reached fetch limit");
                    break;
                }
            }
        }

        tracing::info!(school_id, total = records.len(), "finished fetching teachers");
        Ok(records)
    }
}
