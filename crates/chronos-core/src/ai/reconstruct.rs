//! Fragment reconstruction
//!
//! Wraps a fragment in the historian prompt and asks the model to rewrite it.

use tracing::warn;

use super::client::{GenerationError, TextGenerator};

/// Marker that starts every reconstruction placeholder
pub const RECONSTRUCTION_ERROR_PREFIX: &str = "[Error reconstructing text:";

/// Build the reconstruction prompt for a fragment
pub fn reconstruction_prompt(fragment: &str) -> String {
    format!(
        "You are an AI historian reconstructing incomplete or slang-filled digital text.\n\
         Given the fragment below, rewrite it as a complete, meaningful statement\n\
         that reflects the cultural or digital context of its time.\n\
         \n\
         Fragment:\n\
         \"{}\"\n\
         \n\
         Output only the reconstructed text.",
        fragment
    )
}

/// Reconstruct a fragment, reporting failures as typed errors
pub async fn reconstruct(
    generator: &dyn TextGenerator,
    fragment: &str,
) -> Result<String, GenerationError> {
    let result = generator
        .generate(&reconstruction_prompt(fragment))
        .await
        .and_then(|text| match text.trim() {
            "" => Err(GenerationError::EmptyResponse),
            trimmed => Ok(trimmed.to_string()),
        });
    if let Err(e) = &result {
        warn!("Reconstruction failed: {}", e);
    }
    result
}

/// Placeholder shown in place of reconstructed text when generation fails
pub fn reconstruction_placeholder(error: &GenerationError) -> String {
    format!("{} {}]", RECONSTRUCTION_ERROR_PREFIX, error)
}

/// Reconstructed text, or the placeholder for its error
pub fn text_or_placeholder(result: &Result<String, GenerationError>) -> String {
    match result {
        Ok(text) => text.clone(),
        Err(e) => reconstruction_placeholder(e),
    }
}

/// Reconstruct a fragment, substituting a placeholder on failure
pub async fn reconstruct_text(generator: &dyn TextGenerator, fragment: &str) -> String {
    text_or_placeholder(&reconstruct(generator, fragment).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Generator that records prompts and replays a canned answer
    struct CannedGenerator {
        answer: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedGenerator {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer
                .clone()
                .ok_or_else(|| GenerationError::Blocked("SAFETY".to_string()))
        }
    }

    #[test]
    fn test_prompt_embeds_fragment_in_quotes() {
        let prompt = reconstruction_prompt("brb gtg ttyl");
        assert!(prompt.starts_with("You are an AI historian"));
        assert!(prompt.contains("Fragment:\n\"brb gtg ttyl\"\n"));
        assert!(prompt.ends_with("Output only the reconstructed text."));
    }

    #[tokio::test]
    async fn test_reconstruct_trims_output() {
        let generator = CannedGenerator::answering("\n  Be right back, got to go, talk to you later.  \n");
        let text = reconstruct_text(&generator, "brb gtg ttyl").await;
        assert_eq!(text, "Be right back, got to go, talk to you later.");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("brb gtg ttyl"));
    }

    #[tokio::test]
    async fn test_whitespace_answer_is_an_error() {
        let generator = CannedGenerator::answering("   \n");
        let result = reconstruct(&generator, "lol").await;
        assert!(matches!(result, Err(GenerationError::EmptyResponse)));

        let text = reconstruct_text(&generator, "lol").await;
        assert!(text.starts_with(RECONSTRUCTION_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_failure_becomes_placeholder() {
        let generator = CannedGenerator::failing();
        let text = reconstruct_text(&generator, "omg").await;
        assert_eq!(text, "[Error reconstructing text: prompt blocked: SAFETY]");
    }
}
