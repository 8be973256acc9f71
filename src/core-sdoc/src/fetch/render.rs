//! The rendering engine seam: anything that turns a URL into Markdown plus a categorized link graph.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::RenderError;

/// How the rendering engine should treat a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Ignore any cached copy of the page.
    pub bypass_cache: bool,
    /// Anti-bot-detection and wait-for-load behaviour.
    pub magic: bool,
    /// Drop external links from the link graph.
    pub exclude_external_links: bool,
    pub extraction: ExtractionStrategy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bypass_cache: true,
            magic: true,
            exclude_external_links: false,
            extraction: ExtractionStrategy::None,
        }
    }
}

/// Structured extraction the engine should perform in addition to producing Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionStrategy {
    /// Full page Markdown only.
    #[default]
    None,
}

/// A hyperlink found on a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: String::new(),
        }
    }
}

/// Links on a page, split by whether they stay on the page's site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraph {
    pub internal: Vec<Link>,
    pub external: Vec<Link>,
}

/// What the rendering engine reports for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    pub success: bool,
    pub status_code: Option<u16>,
    pub markdown: String,
    pub links: LinkGraph,
}

impl RenderResult {
    /// A successful render with no external links.
    pub fn ok(markdown: impl Into<String>, internal: Vec<Link>) -> Self {
        Self {
            success: true,
            status_code: Some(200),
            markdown: markdown.into(),
            links: LinkGraph {
                internal,
                external: Vec::new(),
            },
        }
    }

    /// An engine-reported failure.
    pub fn failed(status_code: Option<u16>) -> Self {
        Self {
            success: false,
            status_code,
            ..Self::default()
        }
    }
}

/// Interface to a page rendering engine. Each call may start and tear down an expensive session.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderResult, RenderError>;
}
