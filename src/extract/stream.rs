//! Extractor and page stream

use super::types::{EndpointRequest, ExtractStats};
use crate::classify::{classify_outcome, Payload};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::{
    Advance, ApiEnvelope, DateWindow, PageResponse, PaginationConfig, WindowCursor,
};
use crate::types::Batch;
use futures::Stream;
use tracing::debug;

/// Pulls records out of the API, one endpoint at a time
#[derive(Debug)]
pub struct Extractor {
    client: HttpClient,
    pagination: PaginationConfig,
}

impl Extractor {
    /// Create an extractor on top of a configured client
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            pagination: PaginationConfig::default(),
        }
    }

    /// Create an extractor for a base URL and API token with default settings
    pub fn connect(base_url: impl Into<String>, api_token: &str) -> Result<Self> {
        let config = HttpClientConfig::builder()
            .base_url(base_url)
            .bearer_token(api_token)
            .build();
        Ok(Self::new(HttpClient::with_config(config)?))
    }

    /// Set pagination configuration
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Get the HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Get the pagination configuration
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Start extracting an endpoint
    ///
    /// Nothing is requested until the first batch is pulled.
    pub fn extract(&self, request: EndpointRequest) -> PageStream<'_> {
        let engine = WindowCursor::new(
            &request.name,
            self.pagination.clone(),
            request.date_window(),
        );
        PageStream {
            extractor: self,
            endpoint: request.name,
            engine,
            stats: ExtractStats::new(),
            pending_error: None,
            finished: false,
        }
    }

    /// Fetch the first page of an endpoint, e.g. to verify access
    pub async fn check(&self, endpoint: &str) -> Result<PageResponse> {
        let engine = WindowCursor::new(endpoint, self.pagination.clone(), DateWindow::unbounded());
        self.fetch_page(endpoint, &engine).await
    }

    /// Fetch the page the engine currently points at
    async fn fetch_page(&self, endpoint: &str, engine: &WindowCursor) -> Result<PageResponse> {
        let request = engine.request()?;
        let outcome = self.client.get_with_config(endpoint, request).await;

        match classify_outcome(outcome, endpoint)? {
            Payload::Json(value) => serde_json::from_value::<ApiEnvelope>(value)
                .map(|envelope| envelope.response)
                .map_err(|e| Error::decode(endpoint, format!("unexpected page shape: {e}"))),
            Payload::NoContent => Ok(PageResponse::default()),
            Payload::Text(text) => Err(Error::decode(
                endpoint,
                format!(
                    "expected a JSON page, got: {}",
                    text.chars().take(100).collect::<String>()
                ),
            )),
        }
    }
}

/// Lazy, single-pass sequence of record batches for one endpoint
///
/// Each call to [`next_batch`](Self::next_batch) issues as many requests as
/// it takes to get a non-empty page, or to learn that there is nothing left.
/// After the sequence ends, or after an error, it keeps returning `Ok(None)`.
pub struct PageStream<'a> {
    extractor: &'a Extractor,
    endpoint: String,
    engine: WindowCursor,
    stats: ExtractStats,
    pending_error: Option<Error>,
    finished: bool,
}

impl<'a> PageStream<'a> {
    /// Endpoint being extracted
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current date window, narrowed by any re-anchoring so far
    pub fn window(&self) -> &DateWindow {
        self.engine.window()
    }

    /// Statistics so far
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Whether the sequence has ended
    pub fn is_finished(&self) -> bool {
        self.finished && self.pending_error.is_none()
    }

    /// Pull the next non-empty batch
    pub async fn next_batch(&mut self) -> Result<Option<Batch>> {
        loop {
            if let Some(err) = self.pending_error.take() {
                return Err(err);
            }
            if self.finished {
                return Ok(None);
            }

            let page = match self.extractor.fetch_page(&self.endpoint, &self.engine).await {
                Ok(page) => page,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            };

            self.stats.add_page(page.results.len());
            debug!(
                "Page {} of {}: {} records, {} remaining (cursor {})",
                self.stats.pages_fetched,
                self.endpoint,
                page.results.len(),
                page.remaining,
                self.engine.cursor()
            );

            // Records already received are handed out before any advance error
            match self.engine.advance(&page) {
                Ok(Advance::Exhausted) => self.finished = true,
                Ok(Advance::Reanchor { .. }) => self.stats.add_reanchor(),
                Ok(Advance::Offset { .. }) => {}
                Err(e) => {
                    self.finished = true;
                    self.pending_error = Some(e);
                }
            }

            if !page.results.is_empty() {
                return Ok(Some(page.results));
            }
        }
    }

    /// Turn the page stream into a [`futures::Stream`] of batches
    pub fn into_stream(self) -> impl Stream<Item = Result<Batch>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            let batch = pages.next_batch().await?;
            Ok(batch.map(|batch| (batch, pages)))
        })
    }
}

impl std::fmt::Debug for PageStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStream")
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine)
            .field("stats", &self.stats)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
