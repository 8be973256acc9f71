use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use crate::FetchError;
use crate::fetch::gate::ConcurrencyGate;
use crate::fetch::render::{RenderOptions, Renderer};

/// Raw page content handed from the fetch stage to the generation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutput {
    pub markdown: String,
    /// Deduplicated internal links. Order is not meaningful.
    pub links: Vec<String>,
}

/// Turns a URL into Markdown and its same-site links, with at most `gate.capacity()` renders in flight.
#[derive(Clone)]
pub struct FetchStage {
    renderer: Arc<dyn Renderer>,
    gate: ConcurrencyGate,
    options: RenderOptions,
}

impl FetchStage {
    /// Renders with cache bypass and anti-detection on, full page Markdown and no structured extraction.
    pub fn new(renderer: Arc<dyn Renderer>, gate: ConcurrencyGate) -> Self {
        Self {
            renderer,
            gate,
            options: RenderOptions::default(),
        }
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Fetches one page. Holds a gate slot for exactly the duration of the render.
    /// A single failure is returned immediately, nothing is retried.
    pub async fn crawl_url(&self, url: &Url) -> Result<CrawlOutput, FetchError> {
        let _permit = self.gate.acquire().await.map_err(|_| FetchError::GateClosed {
            url: url.to_string(),
        })?;
        tracing::info!("Starting crawl for: {}", url);

        let result = match self.renderer.render(url, &self.options).await {
            Ok(result) => result,
            Err(source) => {
                let error = FetchError::Engine {
                    url: url.to_string(),
                    source,
                };
                tracing::error!("Error crawling {}: {}", url, error.detail());
                return Err(error);
            }
        };

        if !result.success {
            let error = FetchError::Unsuccessful {
                url: url.to_string(),
                status_code: result.status_code,
            };
            tracing::error!("Crawl failed for {}: {}", url, error.detail());
            return Err(error);
        }

        let links: Vec<String> = result
            .links
            .internal
            .into_iter()
            .map(|link| link.href)
            .collect::<HashSet<String>>()
            .into_iter()
            .collect();

        tracing::info!("Successfully crawled {}, found {} links", url, links.len());
        Ok(CrawlOutput {
            markdown: result.markdown,
            links,
        })
    }
}
