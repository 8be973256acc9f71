//! Mock LLM provider for testing
//!
//! Returns a canned reply (or a configured failure) without making real API
//! calls, and records every request so tests can assert on what was sent.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{GenerationError, llms::LlmProvider};

/// One recorded `complete` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_content: String,
}

/// Mock LLM provider for testing
///
/// Can be configured to:
/// - Return a fixed response for any prompt
/// - Echo the user content back
/// - Simulate API failures
pub struct MockLlmProvider {
    reply: MockReply,
    calls: Mutex<Vec<RecordedCall>>,
}

enum MockReply {
    Fixed(String),
    Echo,
    Fail(String),
}

impl MockLlmProvider {
    /// Create a mock with a default response for any prompt
    pub fn with_default(response: &str) -> Self {
        Self::from_reply(MockReply::Fixed(response.to_string()))
    }

    /// Create a mock that replies with the user content it was sent
    pub fn echo() -> Self {
        Self::from_reply(MockReply::Echo)
    }

    /// Create a mock that always fails with the given provider error message
    pub fn with_failure(message: &str) -> Self {
        Self::from_reply(MockReply::Fail(message.to_string()))
    }

    fn from_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, GenerationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                system_prompt: system_prompt.to_string(),
                user_content: user_content.to_string(),
            });
        }

        match &self.reply {
            MockReply::Fixed(response) => Ok(response.clone()),
            MockReply::Echo => Ok(user_content.to_string()),
            MockReply::Fail(message) => Err(GenerationError::Provider(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_with_default_response() {
        let provider = MockLlmProvider::with_default("test response");
        let result = provider.complete("system", "any prompt").await.unwrap();
        assert_eq!(result, "test response");
    }

    #[tokio::test]
    async fn test_mock_echo() {
        let provider = MockLlmProvider::echo();
        let result = provider.complete("system", "echo me").await.unwrap();
        assert_eq!(result, "echo me");
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let provider = MockLlmProvider::with_failure("rate limited");
        let result = provider.complete("system", "any prompt").await;
        assert!(matches!(result, Err(GenerationError::Provider(msg)) if msg == "rate limited"));
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let provider = MockLlmProvider::with_default("ok");
        provider.complete("sys-1", "user-1").await.unwrap();
        provider.complete("sys-2", "user-2").await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            provider.calls()[1],
            RecordedCall {
                system_prompt: "sys-2".to_string(),
                user_content: "user-2".to_string(),
            }
        );
    }
}
