//! Chronos Core - Shared library for the AI archeologist
//!
//! This crate provides the building blocks behind the `chronos` binary:
//! - Gemini text generation and model listing
//! - Google Custom Search context lookup
//! - Reconstruction report formatting
//! - The linear reconstruct -> search -> report pipeline

pub mod ai;
pub mod config;
pub mod constants;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod search;

// Re-exports for convenience
pub use ai::{GeminiClient, GenerationError, TextGenerator};
pub use config::{ChronosConfig, ConfigError};
pub use pipeline::{Pipeline, ReconstructionReport};
pub use search::{ContextSearch, GoogleSearchClient, SearchError, SearchHit};
