//! Error types for the document processing pipeline.

use thiserror::Error;

/// The generic, user-facing reason a fetch failed. Causes are only logged.
pub const FAILED_TO_CRAWL: &str = "Failed to crawl page";

/// Fetch stage failures. Every variant carries the URL that was being fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The rendering engine ran, but reported that the page could not be rendered.
    #[error("Failed to crawl page")]
    Unsuccessful { url: String, status_code: Option<u16> },

    /// The rendering engine itself failed.
    #[error("Failed to crawl page")]
    Engine {
        url: String,
        #[source]
        source: RenderError,
    },

    /// The concurrency gate was closed while waiting for a slot.
    #[error("Failed to crawl page")]
    GateClosed { url: String },
}

impl FetchError {
    /// The URL whose fetch failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Unsuccessful { url, .. } | Self::Engine { url, .. } | Self::GateClosed { url } => url,
        }
    }

    /// Human readable cause, for logs only.
    pub fn detail(&self) -> String {
        match self {
            Self::Unsuccessful {
                status_code: Some(code), ..
            } => format!("renderer reported failure (HTTP {code})"),
            Self::Unsuccessful { status_code: None, .. } => "renderer reported failure".to_string(),
            Self::Engine { source, .. } => source.to_string(),
            Self::GateClosed { .. } => "concurrency gate closed".to_string(),
        }
    }
}

/// Failures raised by a rendering engine.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rendering engine error: {0}")]
    Engine(String),
}

/// Failures while asking the language model to rewrite a document.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    Api(#[from] async_openai::error::OpenAIError),

    #[error("No response content from LLM")]
    NoResponse,

    #[error("Failed to create prompt: {0}")]
    PromptCreationFailure(#[from] subst::Error),

    #[error("LLM provider error: {0}")]
    Provider(String),
}

/// Request rejected before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("URL must be absolute http or https, got scheme '{0}'")]
    UnsupportedScheme(String),
}
