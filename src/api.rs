//! HTTP surface for LexBrief.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /analyze` – Validate an inline document, run the three-stage analysis pipeline,
//!   and return `{ "summary", "mindMap", "flowchart" }`. The two diagram strings use Mermaid
//!   syntax for a client-side renderer.
//! - `POST /advice` – Answer a legal question as a markdown checklist with reference links.
//! - `GET /metrics` – Observe usage counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Validation failures map to 400 and upstream stage failures to 502, with the error text in
//! the response body.

use crate::pipeline::{AnalysisApi, AnalysisError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the analysis API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AnalysisApi + 'static,
{
    Router::new()
        .route("/analyze", post(analyze_document::<S>))
        .route("/advice", post(get_advice::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Request body for the `POST /analyze` endpoint.
#[derive(Deserialize)]
struct AnalyzeRequest {
    /// Inline document as a `data:<mime>;base64,<payload>` URI.
    document: String,
}

/// Success response for the `POST /analyze` endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    /// Plain-text summary of the document.
    summary: String,
    /// Mermaid mind-map derived from the summary.
    mind_map: String,
    /// Mermaid flowchart derived from the summary.
    flowchart: String,
}

/// Run the analysis pipeline on an inline document.
async fn analyze_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError>
where
    S: AnalysisApi,
{
    let result = service.analyze(request.document).await?;
    tracing::info!(
        summary_chars = result.summary.len(),
        "Analyze request completed"
    );
    Ok(Json(AnalyzeResponse {
        summary: result.summary,
        mind_map: result.mind_map,
        flowchart: result.flowchart,
    }))
}

/// Request body for the `POST /advice` endpoint.
#[derive(Deserialize)]
struct AdviceRequest {
    /// Legal question to answer.
    query: String,
}

/// Success response for the `POST /advice` endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdviceResponse {
    /// Markdown checklist with embedded reference links.
    advice_checklist: String,
}

/// Answer a legal question as a checklist.
async fn get_advice<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, AppError>
where
    S: AnalysisApi,
{
    let checklist = service.advise(request.query).await?;
    Ok(Json(AdviceResponse {
        advice_checklist: checklist,
    }))
}

/// Return a concise metrics snapshot with analysis and advice counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: AnalysisApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "analyze",
                method: "POST",
                path: "/analyze",
                description: "Summarize an inline document and derive Mermaid mind-map and flowchart diagrams. Response returns { \"summary\": string, \"mindMap\": string, \"flowchart\": string }.",
                request_example: Some(json!({
                    "document": "data:text/plain;base64,VGhlIHBhcnRpZXMgYWdyZWUu"
                })),
            },
            CommandDescriptor {
                name: "advice",
                method: "POST",
                path: "/advice",
                description: "Answer a legal question as a markdown checklist with government reference links.",
                request_example: Some(json!({
                    "query": "My employer refuses to pay overtime wages"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return usage counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

struct AppError(AnalysisError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalysisError::Document(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Stage(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(inner: AnalysisError) -> Self {
        Self(inner)
    }
}
