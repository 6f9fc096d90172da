//! Analysis service coordinating the staged completion calls.

use crate::{
    advice,
    completion::{CompletionClient, CompletionRequest, InlineDocument, get_completion_client},
    config::get_config,
    document::DocumentPayload,
    metrics::{MetricsSnapshot, UsageMetrics},
    pipeline::{
        prompts,
        shape,
        types::{AnalysisError, AnalysisResult, Stage, StageError},
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Coordinates the full analysis pipeline: document validation, the summary stage, and the
/// two diagram stages fanned out over the summary.
///
/// The service owns a long-lived completion client and the metrics registry so the HTTP
/// surface reuses the same components across requests. Construct it once near process start
/// and share it through an `Arc`.
pub struct AnalysisService {
    completion_client: Box<dyn CompletionClient + Send + Sync>,
    metrics: Arc<UsageMetrics>,
}

/// Abstraction over the analysis pipeline used by external surfaces.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Validate an inline document and run the three-stage analysis pipeline on it.
    async fn analyze(&self, document: String) -> Result<AnalysisResult, AnalysisError>;

    /// Answer a legal question as a markdown checklist with reference links.
    async fn advise(&self, query: String) -> Result<String, AnalysisError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AnalysisService {
    /// Build a new analysis service using the configured completion provider.
    pub fn new() -> Self {
        tracing::info!("Initializing completion client");
        Self::with_client(get_completion_client())
    }

    /// Build a service around an explicit completion client.
    pub fn with_client(completion_client: Box<dyn CompletionClient + Send + Sync>) -> Self {
        Self {
            completion_client,
            metrics: Arc::new(UsageMetrics::new()),
        }
    }

    /// Validate the document and execute the pipeline: summary first, then mind map and
    /// flowchart concurrently over the same summary.
    ///
    /// Any stage failure aborts the run; the first diagram failure cancels the sibling call
    /// when the join returns. No partial [`AnalysisResult`] is ever produced.
    pub async fn analyze(&self, document: String) -> Result<AnalysisResult, AnalysisError> {
        let payload = DocumentPayload::from_data_uri(&document)?;
        let run_id = uuid::Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            media_type = %payload.media_type,
            bytes = payload.bytes.len(),
            "Starting analysis run"
        );

        let model = get_config().completion_model.clone();
        let summary = self
            .run_stage(
                Stage::Summary,
                CompletionRequest {
                    model: model.clone(),
                    prompt: prompts::summary_prompt().to_string(),
                    attachment: Some(InlineDocument {
                        media_type: payload.media_type,
                        bytes: payload.bytes,
                    }),
                },
            )
            .await?;

        let (mind_map, flowchart) = tokio::try_join!(
            self.run_stage(
                Stage::MindMap,
                CompletionRequest {
                    model: model.clone(),
                    prompt: prompts::mind_map_prompt(&summary),
                    attachment: None,
                },
            ),
            self.run_stage(
                Stage::Flowchart,
                CompletionRequest {
                    model,
                    prompt: prompts::flowchart_prompt(&summary),
                    attachment: None,
                },
            ),
        )?;

        self.metrics.record_analysis(3);
        tracing::info!(run_id = %run_id, summary_chars = summary.len(), "Analysis run completed");

        Ok(AnalysisResult {
            summary,
            mind_map,
            flowchart,
        })
    }

    /// Answer a legal question with a single advice stage call, formatted as a checklist.
    pub async fn advise(&self, query: String) -> Result<String, AnalysisError> {
        let area = advice::identify_legal_area(&query);
        tracing::debug!(area = area.label(), "Classified advice query");

        let model = get_config().completion_model.clone();
        let response = self
            .run_stage(
                Stage::Advice,
                CompletionRequest {
                    model,
                    prompt: prompts::advice_prompt(&query, area.label()),
                    attachment: None,
                },
            )
            .await?;

        let checklist = advice::format_checklist(&response, area.reference_links());
        self.metrics.record_advice();
        Ok(checklist)
    }

    /// Execute one staged call under the configured timeout and shape its output.
    async fn run_stage(
        &self,
        stage: Stage,
        request: CompletionRequest,
    ) -> Result<String, StageError> {
        let timeout_ms = get_config().stage_timeout_ms;
        let started = Instant::now();
        let output = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.completion_client.complete(request),
        )
        .await
        .map_err(|_| StageError::Timeout { stage, timeout_ms })?
        .map_err(|source| StageError::Upstream { stage, source })?;

        let output = match stage.expected_header() {
            Some(header) => {
                let cleaned = shape::strip_code_fences(&output);
                if !shape::has_header(&cleaned, header) {
                    return Err(StageError::MalformedOutput {
                        stage,
                        reason: format!("expected a '{header}' declaration"),
                    });
                }
                cleaned
            }
            None => output,
        };

        tracing::debug!(
            stage = %stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage completed"
        );
        Ok(output)
    }

    /// Return the current usage metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn analyze(&self, document: String) -> Result<AnalysisResult, AnalysisError> {
        AnalysisService::analyze(self, document).await
    }

    async fn advise(&self, query: String) -> Result<String, AnalysisError> {
        AnalysisService::advise(self, query).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        AnalysisService::metrics_snapshot(self)
    }
}
