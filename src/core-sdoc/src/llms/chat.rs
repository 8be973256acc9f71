use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::GenerationError;
use crate::llms::LlmProvider;

/// Connection details for an OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_base: String,
    pub api_key: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: crate::common::settings::DEFAULT_MODEL.to_string(),
            api_base: crate::common::settings::DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            temperature: 0.1,
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// `LlmProvider` backed by any OpenAI-compatible chat completion API (OpenAI, DashScope, vLLM, ...).
pub struct ChatCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl ChatCompletionClient {
    pub fn new(config: &LlmConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.api_base.clone())
            .with_api_key(config.api_key.clone());
        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionClient {
    /// Sends a single, non-streaming chat completion request and returns the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` if:
    /// - The request cannot be built or the API call fails (network, auth, rate limit)
    /// - The response has no choices, or the first choice has no content
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, GenerationError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(self.temperature)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_content)
                    .build()?
                    .into(),
            ])
            .build()?;

        tracing::debug!(
            "Sending chat completion to model '{}' ({} chars of user content)",
            self.model,
            user_content.chars().count()
        );
        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::NoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_debug_redacts_key() {
        let config = LlmConfig {
            api_key: "sk-very-secret".to_string(),
            ..LlmConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("qwen-max"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_generation_error() {
        let config = LlmConfig {
            api_base: "http://127.0.0.1:1/v1".to_string(),
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        };
        let client = ChatCompletionClient::new(&config);
        let result = client.complete("system", "user").await;
        assert!(result.is_err());
    }

    fn completion_body(choices: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "qwen-max",
            "choices": choices,
        })
    }

    fn assistant_choice(content: &str) -> serde_json::Value {
        serde_json::json!([{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
        }])
    }

    /// Serves a fixed chat completion body at `/v1/chat/completions` on an ephemeral local port.
    async fn serve_completion(body: serde_json::Value) -> ChatCompletionClient {
        use axum::{Json, Router, routing::post};

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        ChatCompletionClient::new(&LlmConfig {
            api_base: format!("http://{}/v1", addr),
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        })
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let client = serve_completion(completion_body(assistant_choice("# 标题"))).await;
        let result = client.complete("system", "# Title").await.unwrap();
        assert_eq!(result, "# 标题");
    }

    #[tokio::test]
    async fn test_empty_content_is_no_response() {
        let client = serve_completion(completion_body(assistant_choice(""))).await;
        let result = client.complete("system", "# Title").await;
        assert!(matches!(result, Err(GenerationError::NoResponse)));
    }

    #[tokio::test]
    async fn test_no_choices_is_no_response() {
        let client = serve_completion(completion_body(serde_json::json!([]))).await;
        let result = client.complete("system", "# Title").await;
        assert!(matches!(result, Err(GenerationError::NoResponse)));
    }

    #[cfg_attr(not(has_llm_api_key), ignore = "DASHSCOPE_API_KEY was not set at build time")]
    #[tokio::test]
    async fn test_live_completion() {
        let config = LlmConfig {
            model: common_sdoc::env_or("OPENAI_MODEL", crate::common::settings::DEFAULT_MODEL),
            api_base: common_sdoc::env_or("OPENAI_URL", crate::common::settings::DEFAULT_API_BASE),
            api_key: std::env::var("DASHSCOPE_API_KEY").unwrap_or_default(),
            ..LlmConfig::default()
        };
        let client = ChatCompletionClient::new(&config);
        let response = client
            .complete("You are a helpful assistant.", "Reply with the single word: pong")
            .await
            .unwrap();
        assert!(!response.is_empty(), "Response should not be empty");
    }
}
