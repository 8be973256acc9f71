pub mod routes;

use core_sdoc::Pipeline;

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub project_name: String,
}

impl AppState {
    pub fn new(pipeline: Pipeline, project_name: &str) -> Self {
        Self {
            pipeline,
            project_name: project_name.to_string(),
        }
    }
}
