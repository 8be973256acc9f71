use serde::{Deserialize, Serialize};
use url::Url;

use crate::ValidationError;
use crate::pipeline::PipelineState;

/// Input payload for the document processing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocProcessRequest {
    /// The page to process. Must be an absolute http(s) URL.
    pub url: String,
    /// Deliver the processed Markdown as a file instead of JSON.
    #[serde(default)]
    pub download: bool,
}

impl DocProcessRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            download: false,
        }
    }

    /// The parsed target URL, or why it isn't acceptable.
    pub fn validate(&self) -> Result<Url, ValidationError> {
        validate_url(&self.url)
    }
}

/// Parses `url` and checks that it's an absolute http or https URL.
/// Hostless http(s) URLs never parse, so every accepted URL has a host.
pub fn validate_url(url: &str) -> Result<Url, ValidationError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ValidationError::InvalidUrl(format!("{url} ({e})")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Success,
    Error,
}

/// Response payload for the document processing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocProcessResponse {
    pub url: String,
    pub processed_markdown: String,
    /// Same-site links found on the page, at most 20.
    #[serde(default)]
    pub discovered_links: Vec<String>,
    pub status: ProcessStatus,
    pub error: Option<String>,
}

impl From<PipelineState> for DocProcessResponse {
    fn from(state: PipelineState) -> Self {
        let status = if state.is_error() {
            ProcessStatus::Error
        } else {
            ProcessStatus::Success
        };
        Self {
            url: state.url,
            processed_markdown: state.final_output,
            discovered_links: state.links,
            status,
            error: state.error,
        }
    }
}

/// A file name for downloading the processed page, built from the URL's host and path.
/// e.g. `https://docs.rs/tokio/latest/` becomes `docs.rs_tokio_latest.md`.
pub fn download_filename(url: &Url) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(host) = url.host_str() {
        parts.push(host);
    }
    if let Some(segments) = url.path_segments() {
        parts.extend(segments.filter(|s| !s.is_empty()));
    }

    let stem: String = parts
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let stem = stem.trim_matches(|c| c == '.' || c == '_');
    let stem = stem.strip_suffix(".html").or_else(|| stem.strip_suffix(".htm")).unwrap_or(stem);

    if stem.is_empty() {
        "document.md".to_string()
    } else {
        format!("{stem}.md")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_download_defaults_to_false() {
        let request: DocProcessRequest = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert!(!request.download);
        assert_eq!(request, DocProcessRequest::new("https://example.com"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/doc").is_ok());
        assert!(validate_url("http://localhost:8080/").is_ok());
        assert!(matches!(validate_url("example.com/doc"), Err(ValidationError::InvalidUrl(_))));
        assert!(matches!(validate_url("/relative/path"), Err(ValidationError::InvalidUrl(_))));
        assert!(matches!(validate_url("http://"), Err(ValidationError::InvalidUrl(_))));
        assert!(validate_url("https://example.com/doc").unwrap().host_str().is_some());
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(ValidationError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            validate_url("mailto:someone@example.com"),
            Err(ValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_response_from_state() {
        let mut state = PipelineState::new("https://example.com/doc");
        state.final_output = "# Done".to_string();
        state.links = vec!["https://example.com/a".to_string()];

        let response = DocProcessResponse::from(state);
        assert_eq!(response.status, ProcessStatus::Success);
        assert_eq!(response.processed_markdown, "# Done");
        assert_eq!(response.error, None);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["discovered_links"][0], "https://example.com/a");
    }

    #[test]
    fn test_response_status_error() {
        let mut state = PipelineState::new("https://example.com/doc");
        state.error = Some("Failed to crawl page".to_string());
        let response = DocProcessResponse::from(state);
        assert_eq!(response.status, ProcessStatus::Error);
        assert_eq!(serde_json::to_value(&response).unwrap()["status"], "error");
    }

    #[test]
    fn test_download_filename() {
        let name = |s: &str| download_filename(&Url::parse(s).unwrap());
        assert_eq!(name("https://docs.rs/tokio/latest/"), "docs.rs_tokio_latest.md");
        assert_eq!(name("https://example.com/"), "example.com.md");
        assert_eq!(name("https://example.com/guide/intro.html"), "example.com_guide_intro.md");
        assert_eq!(name("https://example.com/a%20b?x=1"), "example.com_a_20b.md");
    }
}
