use std::sync::Arc;

use crate::GenerationError;
use crate::llms::{LlmProvider, MAX_CONTENT_CHARS, prompt_rewrite_system, prompt_rewrite_user, truncate_chars};
use crate::pipeline::state::{PipelineState, ProcessUpdate};

pub const CRAWL_ERROR_PREFIX: &str = "Error during crawling";
pub const EMPTY_CONTENT_OUTPUT: &str = "Error during crawling.";
pub const EMPTY_CONTENT_ERROR: &str = "raw_markdown is empty";
pub const LLM_ERROR_OUTPUT: &str = "Error processing content with LLM.";

/// Rewrites crawled Markdown (translation, code comments, mermaid diagrams, cleanup) with an LLM.
/// Not gated: unlike fetches, many rewrites may run at once.
#[derive(Clone)]
pub struct GenerationStage {
    provider: Arc<dyn LlmProvider>,
    system_prompt: String,
    max_content_chars: usize,
}

impl GenerationStage {
    /// Fails only if the system prompt template can't be filled in.
    pub fn new(provider: Arc<dyn LlmProvider>, target_language: &str) -> Result<Self, GenerationError> {
        Ok(Self {
            provider,
            system_prompt: prompt_rewrite_system(target_language)?,
            max_content_chars: MAX_CONTENT_CHARS,
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Produces the final output for a state that has been through the fetch stage.
    /// Never fails: model errors become a generic output plus the error detail.
    pub async fn process(&self, state: &PipelineState) -> ProcessUpdate {
        if let Some(error) = &state.error {
            return ProcessUpdate {
                final_output: format!("{CRAWL_ERROR_PREFIX}: {error}"),
                error: None,
            };
        }

        if state.raw_markdown.is_empty() {
            return ProcessUpdate {
                final_output: EMPTY_CONTENT_OUTPUT.to_string(),
                error: Some(EMPTY_CONTENT_ERROR.to_string()),
            };
        }

        tracing::info!("[request: {}] Processing content with LLM...", state.request_id);
        match self.rewrite(&state.raw_markdown).await {
            Ok(final_output) => {
                tracing::debug!(
                    "[request: {}] LLM returned {} chars",
                    state.request_id,
                    final_output.chars().count()
                );
                ProcessUpdate {
                    final_output,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!("[request: {}] LLM processing error: {}", state.request_id, e);
                ProcessUpdate {
                    final_output: LLM_ERROR_OUTPUT.to_string(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn rewrite(&self, raw_markdown: &str) -> Result<String, GenerationError> {
        let content = truncate_chars(raw_markdown, self.max_content_chars);
        let user_content = prompt_rewrite_user(content)?;
        self.provider.complete(&self.system_prompt, &user_content).await
    }
}
