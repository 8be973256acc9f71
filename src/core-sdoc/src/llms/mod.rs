pub mod chat;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod prompts;

use async_trait::async_trait;

pub use chat::{ChatCompletionClient, LlmConfig};
pub use prompts::{MAX_CONTENT_CHARS, prompt_rewrite_system, prompt_rewrite_user, truncate_chars};

use crate::GenerationError;

/// Interface to a hosted LLM: send a system instruction plus one user turn, await the full reply.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, GenerationError>;
}
