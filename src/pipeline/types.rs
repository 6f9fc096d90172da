//! Core data types and error definitions for the analysis pipeline.

use crate::completion::CompletionClientError;
use crate::document::DocumentError;
use thiserror::Error;

/// One network call to the completion capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Summarize the raw document into plain text.
    Summary,
    /// Turn the summary into a hierarchical Mermaid mind map.
    MindMap,
    /// Turn the summary into a sequential Mermaid flowchart.
    Flowchart,
    /// Answer an advice query as stepwise guidance.
    Advice,
}

impl Stage {
    /// Stable identifier used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::MindMap => "mind-map",
            Self::Flowchart => "flowchart",
            Self::Advice => "advice",
        }
    }

    /// Mermaid declaration the stage output must open with, if any.
    pub fn expected_header(self) -> Option<&'static str> {
        match self {
            Self::MindMap => Some("mindmap"),
            Self::Flowchart => Some("flowchart"),
            Self::Summary | Self::Advice => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single staged call, tagged with the stage that raised it.
#[derive(Debug, Error)]
pub enum StageError {
    /// Stage call exceeded the configured timeout.
    #[error("stage '{stage}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Stage that was cancelled.
        stage: Stage,
        /// Timeout applied to the call.
        timeout_ms: u64,
    },
    /// Completion provider reported a failure for this stage.
    #[error("stage '{stage}' failed: {source}")]
    Upstream {
        /// Stage whose call failed.
        stage: Stage,
        /// Underlying provider error.
        #[source]
        source: CompletionClientError,
    },
    /// Model output did not match the shape the stage requires.
    #[error("stage '{stage}' returned malformed output: {reason}")]
    MalformedOutput {
        /// Stage whose output was rejected.
        stage: Stage,
        /// Why the output was rejected.
        reason: String,
    },
}

impl StageError {
    /// Stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Timeout { stage, .. }
            | Self::Upstream { stage, .. }
            | Self::MalformedOutput { stage, .. } => *stage,
        }
    }
}

/// Errors emitted by the analysis pipeline.
///
/// `Document` covers everything rejected before any upstream call; `Stage` covers any staged
/// call failing, after which the whole run is aborted.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Document failed validation; no staged call was made.
    #[error("Invalid document: {0}")]
    Document(#[from] DocumentError),
    /// A staged call failed; no partial result is available.
    #[error("Analysis stage failed: {0}")]
    Stage(#[from] StageError),
}

/// Aggregated output of a successful pipeline run.
///
/// `mind_map` and `flowchart` are always derived from the `summary` of the same run;
/// the struct is built once the final stage completes and never mutated.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Plain-text summary of the document.
    pub summary: String,
    /// Mermaid mind-map derived from the summary.
    pub mind_map: String,
    /// Mermaid flowchart derived from the summary.
    pub flowchart: String,
}
