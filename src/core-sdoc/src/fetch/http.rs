//! A lightweight rendering engine: plain HTTP download, HTML to Markdown conversion, and link extraction.
//! It doesn't execute scripts, so pages that build their content client-side render mostly empty.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use url::Url;

use crate::RenderError;
use crate::fetch::render::{Link, LinkGraph, RenderOptions, RenderResult, Renderer};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
                                  Chrome/124.0.0.0 Safari/537.36";
const PLAIN_USER_AGENT: &str = concat!("smartdoc/", env!("CARGO_PKG_VERSION"));

static NON_CONTENT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>")
        .expect("static regex is valid")
});

/// Bodies larger than this are not converted.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

static BLANK_LINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").expect("static regex is valid"));

/// How a response body gets turned into Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    Text,
}

/// Pages without a content type are assumed to be HTML. Anything that isn't text is refused.
fn body_kind(content_type: Option<&str>) -> Option<BodyKind> {
    let Some(content_type) = content_type else {
        return Some(BodyKind::Html);
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "" | "text/html" | "application/xhtml+xml" => Some(BodyKind::Html),
        "application/json" | "application/xml" => Some(BodyKind::Text),
        m if m.starts_with("text/") || m.ends_with("+xml") || m.ends_with("+json") => Some(BodyKind::Text),
        _ => None,
    }
}

/// `Renderer` that downloads pages over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpRenderer {
    /// Builds the underlying HTTP client. `timeout` bounds each whole request.
    pub fn new(timeout: Duration) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    fn request_headers(options: &RenderOptions) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if options.bypass_cache {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }
        if options.magic {
            headers.insert(header::USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
            headers.insert(
                header::ACCEPT,
                HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
            );
            headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        } else {
            headers.insert(header::USER_AGENT, HeaderValue::from_static(PLAIN_USER_AGENT));
        }
        headers
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url, options: &RenderOptions) -> Result<RenderResult, RenderError> {
        let mut response = self
            .client
            .get(url.as_str())
            .headers(Self::request_headers(options))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} responded with HTTP {}", url, status);
            return Ok(RenderResult::failed(Some(status.as_u16())));
        }

        // links resolve against where redirects actually landed
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let Some(kind) = body_kind(content_type) else {
            tracing::debug!("{} has non-text content type {:?}", url, content_type);
            return Ok(RenderResult::failed(Some(status.as_u16())));
        };

        if response.content_length().is_some_and(|len| len > self.max_body_bytes as u64) {
            tracing::debug!("{} body exceeds {} bytes", url, self.max_body_bytes);
            return Ok(RenderResult::failed(Some(status.as_u16())));
        }
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_body_bytes {
                tracing::debug!("{} body exceeds {} bytes", url, self.max_body_bytes);
                return Ok(RenderResult::failed(Some(status.as_u16())));
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes);

        let (markdown, links) = match kind {
            BodyKind::Html => (html_to_markdown(&body), extract_links(&body, &final_url, options)),
            BodyKind::Text => (body.into_owned(), LinkGraph::default()),
        };

        Ok(RenderResult {
            success: true,
            status_code: Some(status.as_u16()),
            markdown,
            links,
        })
    }
}

/// Converts a full HTML page to Markdown, dropping scripts and styles.
pub fn html_to_markdown(html: &str) -> String {
    let cleaned = NON_CONTENT_BLOCKS.replace_all(html, "");
    let markdown = html2md::parse_html(&cleaned);
    BLANK_LINE_RUNS.replace_all(&markdown, "\n\n").trim().to_string()
}

/// Collects every http(s) link on the page, resolved to absolute form without fragments,
/// and sorts them into internal (same site as `page_url`) and external.
pub fn extract_links(html: &str, page_url: &Url, options: &RenderOptions) -> LinkGraph {
    let mut graph = LinkGraph::default();
    let Ok(anchors) = Selector::parse("a[href]") else {
        return graph;
    };
    let document = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();

    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = page_url.join(href.trim()) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        resolved.set_fragment(None);

        let href = resolved.to_string();
        if !seen.insert(href.clone()) {
            continue;
        }
        let link = Link {
            href,
            text: element.text().collect::<String>().trim().to_string(),
        };

        if is_same_site(page_url, &resolved) {
            graph.internal.push(link);
        } else if !options.exclude_external_links {
            graph.external.push(link);
        }
    }
    graph
}

/// True when both URLs have the same host, treating `www.example.com` and `example.com` as one site.
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    fn site(url: &Url) -> Option<String> {
        url.host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    }
    match (site(a), site(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
