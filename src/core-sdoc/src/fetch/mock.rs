//! Mock rendering engine for testing
//!
//! Returns a canned `RenderResult` (or engine error) for every URL and keeps
//! counters so tests can check how many renders ran and how many overlapped.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::RenderError;
use crate::fetch::render::{Link, RenderOptions, RenderResult, Renderer};

pub struct MockRenderer {
    outcome: Result<RenderResult, String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<(String, RenderOptions)>>,
}

impl MockRenderer {
    /// Renders every page successfully with the given Markdown and internal links.
    pub fn with_page(markdown: &str, internal_hrefs: &[&str]) -> Self {
        let links = internal_hrefs.iter().map(|href| Link::new(*href)).collect();
        Self::with_result(RenderResult::ok(markdown, links))
    }

    /// Returns the given result for every page.
    pub fn with_result(result: RenderResult) -> Self {
        Self::from_outcome(Ok(result))
    }

    /// The engine runs but reports `success = false`.
    pub fn unsuccessful() -> Self {
        Self::with_result(RenderResult::failed(Some(500)))
    }

    /// The engine itself errors out.
    pub fn with_engine_error(message: &str) -> Self {
        Self::from_outcome(Err(message.to_string()))
    }

    /// Every render sleeps this long before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn from_outcome(outcome: Result<RenderResult, String>) -> Self {
        Self {
            outcome,
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// The most renders that were ever running at the same instant.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// URL and options of every render call, oldest first.
    pub fn requests(&self) -> Vec<(String, RenderOptions)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderResult, RenderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((url.to_string(), *options));
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcome.clone().map_err(RenderError::Engine)
    }
}
