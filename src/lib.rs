#![deny(missing_docs)]

//! Core library for the LexBrief analysis server.

/// Checklist formatting and legal-area lookup for the advice flow.
pub mod advice;
/// HTTP routing and REST handlers.
pub mod api;
/// Completion client abstraction and provider adapters.
pub mod completion;
/// Environment-driven configuration management.
pub mod config;
/// Inline document decoding and validation.
pub mod document;
/// Structured logging and tracing setup.
pub mod logging;
/// Usage metrics helpers.
pub mod metrics;
/// Document analysis pipeline.
pub mod pipeline;
