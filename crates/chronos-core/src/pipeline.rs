//! Reconstruct -> search -> report pipeline
//!
//! Runs the two network steps strictly in order. Failures never stop the
//! pipeline: they are kept as typed errors on the report and rendered as
//! placeholders.

use tracing::info;

use crate::ai::{reconstruct, text_or_placeholder, GenerationError, TextGenerator};
use crate::report;
use crate::search::{search_sources, source_lines, ContextSearch, SearchError, SearchHit};

/// Everything one run produced
#[derive(Debug)]
pub struct ReconstructionReport {
    /// Fragment exactly as entered
    pub fragment: String,
    /// Reconstructed text or the reason there is none
    pub reconstruction: Result<String, GenerationError>,
    /// Search hits or the reason there are none
    pub sources: Result<Vec<SearchHit>, SearchError>,
}

impl ReconstructionReport {
    /// Reconstructed text, or its error placeholder
    pub fn reconstructed_text(&self) -> String {
        text_or_placeholder(&self.reconstruction)
    }

    /// Formatted source lines (1 to 5 entries)
    pub fn source_lines(&self) -> Vec<String> {
        source_lines(&self.sources)
    }

    /// Whether either step fell back to a placeholder
    pub fn is_degraded(&self) -> bool {
        self.reconstruction.is_err() || self.sources.is_err()
    }

    /// Render the full report text
    pub fn render(&self) -> String {
        report::generate_report(
            &self.fragment,
            &self.reconstructed_text(),
            &self.source_lines(),
        )
    }
}

/// The linear reconstruction pipeline
pub struct Pipeline<'a> {
    generator: &'a dyn TextGenerator,
    searcher: &'a dyn ContextSearch,
}

impl<'a> Pipeline<'a> {
    pub fn new(generator: &'a dyn TextGenerator, searcher: &'a dyn ContextSearch) -> Self {
        Self {
            generator,
            searcher,
        }
    }

    /// Run all steps for `fragment`
    pub async fn run(&self, fragment: &str) -> ReconstructionReport {
        self.run_with(fragment, |_| {}).await
    }

    /// Run all steps, calling `on_search` with the query before searching
    ///
    /// When reconstruction fails, its placeholder text is used as the query.
    pub async fn run_with<F>(&self, fragment: &str, on_search: F) -> ReconstructionReport
    where
        F: FnOnce(&str),
    {
        info!("Reconstructing fragment ({} chars)", fragment.chars().count());
        let reconstruction = reconstruct(self.generator, fragment).await;
        let query = text_or_placeholder(&reconstruction);

        on_search(&query);
        let sources = search_sources(self.searcher, &query).await;

        ReconstructionReport {
            fragment: fragment.to_string(),
            reconstruction,
            sources,
        }
    }
}
