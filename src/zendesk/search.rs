use super::{Transport, ZendeskClient};
use crate::error::Result;
use crate::models::{SearchPage, Ticket};
use reqwest::{Method, Url};
use std::collections::VecDeque;
use tracing::{debug, instrument};

const SEARCH_PATH: &str = "search.json";

enum PageRequest {
    Search { url: Url, query: String },
    /// Raw `next_page` value, resolved against the base URL when fetched.
    Cursor(String),
}

/// Walks a search result set page by page.
///
/// Tickets are handed out one at a time and the next page is only requested
/// once the current one has been drained. A failed request ends the sequence.
pub struct QueryPager<'a, T> {
    client: &'a ZendeskClient<T>,
    pending: Option<PageRequest>,
    buffer: VecDeque<Ticket>,
    pages_fetched: usize,
}

impl<T: Transport> ZendeskClient<T> {
    /// Start a search. No request is made until the first ticket is pulled.
    pub fn query(&self, query: &str) -> Result<QueryPager<'_, T>> {
        let url = self.endpoint(SEARCH_PATH)?;
        Ok(QueryPager {
            client: self,
            pending: Some(PageRequest::Search {
                url,
                query: query.to_string(),
            }),
            buffer: VecDeque::new(),
            pages_fetched: 0,
        })
    }
}

impl<T: Transport> QueryPager<'_, T> {
    pub async fn next_ticket(&mut self) -> Result<Option<Ticket>> {
        loop {
            if let Some(ticket) = self.buffer.pop_front() {
                return Ok(Some(ticket));
            }

            let Some(request) = self.pending.take() else {
                return Ok(None);
            };

            let page = self.fetch(request).await?;
            if let Some(cursor) = page.cursor() {
                self.pending = Some(PageRequest::Cursor(cursor.to_string()));
            }
            self.buffer.extend(page.results);
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    #[instrument(skip_all)]
    async fn fetch(&mut self, request: PageRequest) -> Result<SearchPage> {
        let page: SearchPage = match request {
            PageRequest::Search { url, query } => {
                self.client
                    .request(Method::GET, url, &[("query", query.as_str())])
                    .await?
            }
            // The cursor URL already carries the query, so it is not re-sent.
            PageRequest::Cursor(cursor) => {
                let url = self.client.endpoint(&cursor)?;
                self.client.request(Method::GET, url, &[]).await?
            }
        };
        self.pages_fetched += 1;

        debug!(
            page = self.pages_fetched,
            results = page.results.len(),
            count = ?page.count,
            has_next = page.cursor().is_some(),
            "Fetched search page"
        );
        Ok(page)
    }
}
