//! stress-lens command line: run the HTTP service or analyze a single text.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use stress_lens::{
    AnalysisOrchestrator, Config, Language, ReportRenderer, ResponseContract, clients::GeminiClient,
    highlight, http, logging,
};

#[derive(Parser)]
#[command(name = "stress-lens")]
#[command(about = "Stress classification for free-form text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve,
    /// Analyze one text and print the result as JSON
    Analyze {
        /// Text to analyze
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the text from a file instead (stdin when neither is given)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Language hint, e.g. "hi" or "Spanish"
        #[arg(long)]
        language: Option<String>,
        /// Also write a PDF report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the response schema sent to the oracle
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = logging::init()?;
    let config = Config::load()?;
    if let Err(err) = log.apply(&config.runtime.log_level) {
        tracing::warn!(
            "invalid log filter '{}', keeping provisional filter: {}",
            config.runtime.log_level,
            err
        );
    }

    match cli.command {
        Commands::Serve => http::start_http_server(config).await?,
        Commands::Analyze {
            text,
            file,
            language,
            report,
        } => analyze(&config, text, file, language, report).await?,
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&ResponseContract::schema())?);
        }
    }
    Ok(())
}

async fn analyze(
    config: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    language: Option<String>,
    report: Option<PathBuf>,
) -> Result<()> {
    let text = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let hint = match language.as_deref() {
        Some(tag) => Some(
            Language::from_tag(tag).with_context(|| format!("unsupported language: {}", tag))?,
        ),
        None => None,
    };

    let oracle = GeminiClient::from_config(config)?;
    let orchestrator = AnalysisOrchestrator::new(Arc::new(oracle));
    let result = match orchestrator.analyze_with_language(&text, hint).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(kind = err.kind(), "{}", err);
            anyhow::bail!("{}", err.user_message());
        }
    };

    let segments = highlight(&text, &result.keywords);
    let output = json!({ "result": &result, "highlights": segments });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(path) = report {
        let renderer = ReportRenderer::new(config.report.clone());
        let bytes = renderer.render(&text, &result)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("report written to {}", path.display());
    }
    Ok(())
}
