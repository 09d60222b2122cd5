//! Reconstruction report formatting

use std::io;

const BANNER_WIDTH: usize = 60;
const REPORT_TITLE: &str = "🧠  PROJECT CHRONOS: RECONSTRUCTION REPORT";

fn banner() -> String {
    "=".repeat(BANNER_WIDTH)
}

/// Render the report as text
///
/// Sections always appear in the same order: title banner, original fragment,
/// reconstructed text, sources, closing banner.
pub fn generate_report(original: &str, reconstructed: &str, sources: &[String]) -> String {
    let bar = banner();
    let source_block: String = sources.iter().map(|line| format!("* {}\n", line)).collect();

    format!(
        "\n{bar}\n{title}\n{bar}\n\n\
         [Original Fragment]\n> {original}\n\n\
         [AI-Reconstructed Text]\n> {reconstructed}\n\n\
         [Contextual Sources]\n{source_block}\n\
         {bar}\n\n",
        title = REPORT_TITLE,
    )
}

/// Write the report to `writer`
pub fn write_report<W: io::Write>(
    writer: &mut W,
    original: &str,
    reconstructed: &str,
    sources: &[String],
) -> io::Result<()> {
    writer.write_all(generate_report(original, reconstructed, sources).as_bytes())?;
    writer.flush()
}
