//! Gemini provider layer
//!
//! Text generation for the reconstruction step and the standalone model listing.

pub mod client;
pub mod models;
pub mod reconstruct;

pub use client::{model_id, GeminiClient, GenerationError, TextGenerator};
pub use models::{format_model_names, list_models, ModelInfo};
pub use reconstruct::{
    reconstruct, reconstruct_text, reconstruction_placeholder, reconstruction_prompt,
    text_or_placeholder, RECONSTRUCTION_ERROR_PREFIX,
};
