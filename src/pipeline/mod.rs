//! Document analysis pipeline: summarization and diagram generation.

pub mod prompts;
mod service;
pub mod shape;
pub mod types;

pub use service::{AnalysisApi, AnalysisService};
pub use types::{AnalysisError, AnalysisResult, Stage, StageError};
