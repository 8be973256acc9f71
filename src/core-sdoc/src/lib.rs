pub mod common;
pub mod errors;
pub mod fetch;
pub mod llms;
pub mod models;
pub mod pipeline;

pub use errors::{FetchError, GenerationError, RenderError, ValidationError};

pub use common::listen_addr::{ListenAddrError, get_listen_addr};
pub use common::logging::setup_logging;
pub use common::max_concurrency::{MaxConcurrencyError, max_concurrent_crawls};
pub use common::settings::{ConfigError, Settings};

pub use fetch::{ConcurrencyGate, FetchStage, HttpRenderer, RenderOptions, RenderResult, Renderer};
pub use llms::{ChatCompletionClient, LlmConfig, LlmProvider};
pub use models::{DocProcessRequest, DocProcessResponse, ProcessStatus, download_filename, validate_url};
pub use pipeline::{Pipeline, PipelineState};
