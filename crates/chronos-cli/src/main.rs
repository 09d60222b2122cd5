//! Chronos - The AI Archeologist
//!
//! Reconstructs fragmented or slang-filled digital text with Gemini, looks up
//! web sources for the result, and prints a reconstruction report.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use chronos_core::ai::{format_model_names, list_models};
use chronos_core::{paths, ChronosConfig, ConfigError, GeminiClient, GoogleSearchClient, Pipeline};

/// Chronos - AI Archeologist
#[derive(Parser)]
#[command(name = "chronos")]
#[command(about = "Reconstruct fragmented digital text and find its context", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Fragment to reconstruct (prompted for on stdin when omitted)
    #[arg(short, long, global = true)]
    fragment: Option<String>,

    /// Gemini model to use (overrides GEMINI_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Read configuration from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a fragment and print the report (default)
    Reconstruct,

    /// List the Gemini models available to the configured key
    Models,
}

/// Log to a file so stdout only carries the report
fn init_logging() {
    let log_dir = paths::logs_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let writer: Box<dyn Write + Send> = match std::fs::File::create(log_dir.join("chronos.log")) {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(writer))
        .with_ansi(false)
        .init();
}

/// Prompt for a fragment on `input`
fn read_fragment<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    write!(out, "Enter an old/fragmented digital text: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no fragment provided (stdin closed)");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn run_reconstruct<R: BufRead, W: Write>(
    config: &ChronosConfig,
    fragment: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "=== Project Chronos: The AI Archeologist ===")?;
    let fragment = match fragment {
        Some(fragment) => fragment,
        None => read_fragment(input, out)?,
    };

    let generator = GeminiClient::new(config);
    let searcher = GoogleSearchClient::new(config);
    if !config.has_search_credentials() {
        tracing::warn!("Search credentials missing, context search will be skipped");
    }

    let mut progress = Ok(());
    let report = Pipeline::new(&generator, &searcher)
        .run_with(&fragment, |query| {
            progress = writeln!(out, "\n🔍 Searching for context related to: {}", query);
        })
        .await;
    progress?;

    if report.is_degraded() {
        tracing::info!("Report contains placeholders");
    }

    chronos_core::report::write_report(
        out,
        &report.fragment,
        &report.reconstructed_text(),
        &report.source_lines(),
    )?;
    Ok(())
}

async fn run_models<W: Write>(config: &ChronosConfig, out: &mut W) -> Result<()> {
    let client = GeminiClient::new(config);
    let models = list_models(&client).await?;
    writeln!(out, "{}", format_model_names(&models))?;
    Ok(())
}

/// Run one command with injected configuration loading and I/O
///
/// Configuration is resolved before anything is written or read.
async fn run<L, R, W>(cli: Cli, load_config: L, input: &mut R, out: &mut W) -> Result<()>
where
    L: FnOnce(Option<&Path>) -> Result<ChronosConfig, ConfigError>,
    R: BufRead,
    W: Write,
{
    let config = load_config(cli.env_file.as_deref()).map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;
    let config = match cli.model {
        Some(model) => config.with_model(model),
        None => config,
    };
    tracing::info!("Using model {}", config.model);

    match cli.command {
        Some(Commands::Models) => run_models(&config, out).await,
        Some(Commands::Reconstruct) | None => {
            run_reconstruct(&config, cli.fragment, input, out).await
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let mut input = io::stdin().lock();
    let mut out = io::stdout();

    if let Err(e) = run(cli, ChronosConfig::load, &mut input, &mut out).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
