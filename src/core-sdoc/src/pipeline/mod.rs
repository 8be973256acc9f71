//! Fetch → generate, once per request.
//!
//! The pipeline is a fixed linear sequence: `Fetching` always hands over to
//! `Generating` (even when the fetch failed, so the generation stage can produce
//! the uniform error output), and `Generating` always ends the run.

pub mod generate;
pub mod state;

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

pub use generate::GenerationStage;
pub use state::{CrawlUpdate, MAX_LINKS, PipelineState, ProcessUpdate};

use crate::common::settings::Settings;
use crate::fetch::{ConcurrencyGate, FetchStage, HttpRenderer, Renderer};
use crate::llms::{ChatCompletionClient, LlmProvider};
use crate::models::DocProcessResponse;

/// Where a pipeline run is, or how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Generating,
    Success,
    Error,
}

impl Phase {
    /// The only transition out of each phase. Terminal phases stay put.
    pub fn next(self, state: &PipelineState) -> Phase {
        match self {
            Phase::Fetching => Phase::Generating,
            Phase::Generating if state.is_error() => Phase::Error,
            Phase::Generating => Phase::Success,
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Error)
    }
}

/// The document processing pipeline. Cheap to clone; clones share the fetch gate.
#[derive(Clone)]
pub struct Pipeline {
    fetch: FetchStage,
    generate: GenerationStage,
}

impl Pipeline {
    pub fn new(fetch: FetchStage, generate: GenerationStage) -> Self {
        Self { fetch, generate }
    }

    /// Wires collaborators together with a fresh gate of `max_concurrent_crawls` slots.
    pub fn with_collaborators(
        renderer: Arc<dyn Renderer>,
        provider: Arc<dyn LlmProvider>,
        max_concurrent_crawls: usize,
        target_language: &str,
    ) -> Result<Self, crate::GenerationError> {
        let fetch = FetchStage::new(renderer, ConcurrencyGate::new(max_concurrent_crawls));
        let generate = GenerationStage::new(provider, target_language)?;
        Ok(Self::new(fetch, generate))
    }

    /// The production pipeline: HTTP renderer plus the configured chat completion endpoint.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let renderer = Arc::new(HttpRenderer::new(settings.render_timeout)?);
        let provider = Arc::new(ChatCompletionClient::new(&settings.llm));
        tracing::info!(
            "Pipeline ready: model '{}' at {}, {} concurrent crawls",
            provider.model(),
            settings.llm.api_base,
            settings.max_concurrent_crawls
        );
        Ok(Self::with_collaborators(
            renderer,
            provider,
            settings.max_concurrent_crawls,
            &settings.target_language,
        )?)
    }

    pub fn fetch_stage(&self) -> &FetchStage {
        &self.fetch
    }

    /// Runs both stages for one URL. Never fails: every problem ends up in the state's error field.
    pub async fn run_workflow(&self, url: &Url) -> PipelineState {
        self.run_workflow_with_id(Uuid::new_v4(), url).await
    }

    /// Like `run_workflow`, tagging every log line with `request_id`.
    pub async fn run_workflow_with_id(&self, request_id: Uuid, url: &Url) -> PipelineState {
        let mut state = PipelineState::with_request_id(request_id, url.as_str());
        let mut phase = Phase::Fetching;

        while !phase.is_terminal() {
            tracing::debug!("[request: {}] {:?} {}", state.request_id, phase, state.url);
            match phase {
                Phase::Fetching => {
                    let update = match self.fetch.crawl_url(url).await {
                        Ok(output) => CrawlUpdate::success(output),
                        Err(e) => {
                            tracing::warn!("[request: {}] Fetch failed for {}: {}", state.request_id, e.url(), e.detail());
                            CrawlUpdate::failure(e)
                        }
                    };
                    state.apply_crawl(update);
                }
                Phase::Generating => {
                    let update = self.generate.process(&state).await;
                    state.apply_process(update);
                }
                Phase::Success | Phase::Error => {}
            }
            phase = phase.next(&state);
        }

        tracing::info!(
            "[request: {}] Finished {} with {:?} ({} links)",
            state.request_id,
            state.url,
            phase,
            state.links.len()
        );
        state
    }

    /// Runs the pipeline and shapes the result as an API response.
    pub async fn process(&self, url: &Url) -> DocProcessResponse {
        self.run_workflow(url).await.into()
    }

    pub async fn process_with_id(&self, request_id: Uuid, url: &Url) -> DocProcessResponse {
        self.run_workflow_with_id(request_id, url).await.into()
    }
}
