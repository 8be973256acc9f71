use uuid::Uuid;

use crate::fetch::CrawlOutput;

/// Links beyond this many are dropped before they leave the pipeline.
pub const MAX_LINKS: usize = 20;

/// Everything known about one request as it moves through the pipeline.
/// Every field exists from construction; stages fill them in through their update types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    /// Only used to correlate log lines.
    pub request_id: Uuid,
    pub url: String,
    pub raw_markdown: String,
    pub links: Vec<String>,
    pub final_output: String,
    pub error: Option<String>,
}

impl PipelineState {
    pub fn new(url: &str) -> Self {
        Self::with_request_id(Uuid::new_v4(), url)
    }

    /// A fresh state whose log lines carry an id assigned by the caller.
    pub fn with_request_id(request_id: Uuid, url: &str) -> Self {
        Self {
            request_id,
            url: url.to_string(),
            raw_markdown: String::new(),
            links: Vec::new(),
            final_output: String::new(),
            error: None,
        }
    }

    /// Merges the fetch stage's result. The fetch stage owns `raw_markdown` and `links`.
    pub fn apply_crawl(&mut self, update: CrawlUpdate) {
        self.raw_markdown = update.raw_markdown;
        self.links = update.links;
        self.error = update.error;
    }

    /// Merges the generation stage's result. The generation stage owns `final_output`
    /// and may add an error, but never clears one set by the fetch stage.
    pub fn apply_process(&mut self, update: ProcessUpdate) {
        self.final_output = update.final_output;
        if update.error.is_some() {
            self.error = update.error;
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// The fetch stage's contribution to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlUpdate {
    pub raw_markdown: String,
    pub links: Vec<String>,
    pub error: Option<String>,
}

impl CrawlUpdate {
    /// Successful crawl, links capped at `MAX_LINKS`.
    pub fn success(output: CrawlOutput) -> Self {
        let mut links = output.links;
        links.truncate(MAX_LINKS);
        Self {
            raw_markdown: output.markdown,
            links,
            error: None,
        }
    }

    /// Failed crawl: no content, no links.
    pub fn failure(error: impl ToString) -> Self {
        Self {
            raw_markdown: String::new(),
            links: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// The generation stage's contribution to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessUpdate {
    pub final_output: String,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = PipelineState::new("https://example.com/doc");
        assert_eq!(state.url, "https://example.com/doc");
        assert!(state.raw_markdown.is_empty());
        assert!(state.links.is_empty());
        assert!(state.final_output.is_empty());
        assert!(!state.is_error());
    }

    #[test]
    fn test_with_request_id() {
        let id = Uuid::new_v4();
        let state = PipelineState::with_request_id(id, "https://example.com");
        assert_eq!(state.request_id, id);
        assert_eq!(state, PipelineState { request_id: id, ..PipelineState::new("https://example.com") });
    }

    #[test]
    fn test_crawl_success_caps_links() {
        let links: Vec<String> = (0..50).map(|i| format!("https://example.com/{i}")).collect();
        let update = CrawlUpdate::success(CrawlOutput {
            markdown: "# Doc".to_string(),
            links,
        });
        assert_eq!(update.links.len(), MAX_LINKS);
        assert_eq!(update.error, None);
    }

    #[test]
    fn test_process_update_never_clears_error() {
        let mut state = PipelineState::new("https://example.com");
        state.apply_crawl(CrawlUpdate::failure("Failed to crawl page"));
        state.apply_process(ProcessUpdate {
            final_output: "Error during crawling: Failed to crawl page".to_string(),
            error: None,
        });
        assert_eq!(state.error.as_deref(), Some("Failed to crawl page"));
        assert_eq!(state.final_output, "Error during crawling: Failed to crawl page");
    }

    #[test]
    fn test_process_update_can_add_error() {
        let mut state = PipelineState::new("https://example.com");
        state.apply_crawl(CrawlUpdate::success(CrawlOutput {
            markdown: "# Doc".to_string(),
            links: vec![],
        }));
        state.apply_process(ProcessUpdate {
            final_output: "Error processing content with LLM.".to_string(),
            error: Some("timeout".to_string()),
        });
        assert!(state.is_error());
        assert_eq!(state.raw_markdown, "# Doc");
    }
}
