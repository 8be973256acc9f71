use axum::{
    Extension,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use core_sdoc::{DocProcessRequest, ProcessStatus, ValidationError, download_filename};

use crate::AppState;
use crate::routes::logging_middleware::RequestId;

/// Error for POST {API_V1_STR}/process. Pipeline failures are not errors here:
/// they come back as a normal response with `status: "error"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum ProcessError {
    /// The request URL is not an absolute http(s) URL
    #[serde(rename = "invalid_url")]
    InvalidUrl(String),
}

impl From<ValidationError> for ProcessError {
    fn from(e: ValidationError) -> Self {
        ProcessError::InvalidUrl(e.to_string())
    }
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        let status = match self {
            ProcessError::InvalidUrl(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(self)).into_response()
    }
}

/// POST {API_V1_STR}/process - Fetch a page and rewrite it with the LLM
///
/// With `download: true` a successful result is delivered as a Markdown file attachment.
pub async fn post_process(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(payload): Json<DocProcessRequest>,
) -> Result<Response, ProcessError> {
    let url = payload.validate().inspect_err(|e| {
        tracing::debug!("[request: {}] Rejected {:?}: {}", request_id, payload.url, e);
    })?;

    let response = state.pipeline.process_with_id(request_id, &url).await;
    tracing::debug!("{} finished with status {:?}", response.url, response.status);

    if payload.download && response.status == ProcessStatus::Success {
        let disposition = format!("attachment; filename=\"{}\"", download_filename(&url));
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            response.processed_markdown,
        )
            .into_response());
    }

    Ok((StatusCode::OK, Json(response)).into_response())
}
