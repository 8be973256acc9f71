pub mod gate;
pub mod http;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod render;
pub mod stage;

pub use gate::{ConcurrencyGate, GatePermit};
pub use http::HttpRenderer;
pub use render::{ExtractionStrategy, Link, LinkGraph, RenderOptions, RenderResult, Renderer};
pub use stage::{CrawlOutput, FetchStage};
