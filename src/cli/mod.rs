//! Command-line interface for quote-anchor.
//!
//! Provides commands for locating a single quote, grounding a batch of
//! extractions, verifying persisted spans and showing configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::{self, ResolvedConfig};
use crate::evidence::offset_to_line_col;
use crate::locate::{LocateOptions, Locator, SpanMatch};

pub mod evidence;

/// quote-anchor - locate extracted quotes in their source documents
#[derive(Parser, Debug)]
#[command(name = "quote-anchor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Locate a quote in a source document
    Locate {
        /// Quote to locate (may contain "..." omission markers)
        query: String,

        /// Source document
        #[arg(short, long)]
        source: PathBuf,

        /// Per-word similarity threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ground every extraction in a JSONL file against a source document
    Ground {
        /// Source document
        #[arg(short, long)]
        source: PathBuf,

        /// Extractions, one JSON object per line
        #[arg(short, long)]
        input: PathBuf,

        /// Append grounded records here (stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-word similarity threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Verify grounded records against the current source document
    Verify {
        /// Source document
        #[arg(short, long)]
        source: PathBuf,

        /// Grounded records, one JSON object per line
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Locate {
                query,
                source,
                threshold,
                json,
            } => locate_quote(&query, &source, threshold, json).await,
            Commands::Ground {
                source,
                input,
                output,
                threshold,
            } => evidence::execute_ground(&source, &input, output.as_deref(), threshold).await,
            Commands::Verify { source, input } => evidence::execute_verify(&source, &input).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build a locator from config, with an optional threshold override
pub(crate) fn build_locator(config: &ResolvedConfig, threshold: Option<f64>) -> Result<Locator> {
    let options = LocateOptions {
        typo_threshold: threshold.unwrap_or(config.locate.typo_threshold),
        ..config.locate
    };
    Locator::new(options).context("Invalid locator options")
}

/// Read a source document as UTF-8
pub(crate) async fn read_source(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read source file: {}", path.display()))
}

#[derive(Serialize)]
struct LocateOutput<'a> {
    found: bool,
    #[serde(flatten)]
    result: Option<SpanMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Execute the `locate` command
async fn locate_quote(query: &str, source_path: &Path, threshold: Option<f64>, json: bool) -> Result<()> {
    let config = config::config()?;
    let locator = build_locator(config, threshold)?;
    let source = read_source(source_path).await?;

    let found = locator
        .find(query, &source)
        .with_context(|| format!("Failed to locate quote in {}", source_path.display()))?;
    let text = found.and_then(|m| m.span.slice(&source));

    if json {
        let output = LocateOutput {
            found: found.is_some(),
            result: found,
            text,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let (Some(found), Some(text)) = (found, text) else {
        // Not a failure: there is simply nothing to highlight
        println!("Not found");
        return Ok(());
    };

    let line_col = found
        .span
        .byte_range(&source)
        .map(|range| offset_to_line_col(&source, range.start));

    println!("Span:     {} - {} (chars)", found.span.start, found.span.end);
    if let Some(line_col) = line_col {
        println!("Position: line {}, col {}", line_col.line, line_col.col);
    }
    println!("Method:   {}", found.method.as_str());
    println!("Score:    {:.3}", found.score);
    if found.chunk_count > 1 {
        println!("Chunks:   {}", found.chunk_count);
    }
    println!();
    println!("Snippet:");
    println!("  ---");
    for line in text.lines().take(5) {
        println!("  {}", line);
    }
    if text.lines().count() > 5 {
        println!("  ...");
    }
    println!("  ---");

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("quote-anchor configuration:");
    match &config.config_file {
        Some(path) => println!("  Config file:      {}", path.display()),
        None => println!("  Config file:      (none, using defaults)"),
    }
    println!("  Typo threshold:   {}", config.locate.typo_threshold);
    println!("  Gap factor:       {}", config.locate.gap_factor);
    println!("  Min fuzzy words:  {}", config.locate.min_fuzzy_words);
    match config.locate.max_source_chars {
        Some(limit) => println!("  Max source chars: {}", limit),
        None => println!("  Max source chars: (unlimited)"),
    }
    println!("  Anchor window:    {}", config.anchor_window);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_locate() {
        let cli = Cli::try_parse_from([
            "quote-anchor",
            "locate",
            "Barack Obama",
            "--source",
            "article.txt",
            "--threshold",
            "0.9",
        ])
        .unwrap();

        match cli.command {
            Commands::Locate {
                query,
                source,
                threshold,
                json,
            } => {
                assert_eq!(query, "Barack Obama");
                assert_eq!(source, PathBuf::from("article.txt"));
                assert_eq!(threshold, Some(0.9));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_source() {
        assert!(Cli::try_parse_from(["quote-anchor", "locate", "q"]).is_err());
    }

    #[test]
    fn test_build_locator_threshold_override() {
        let config = ResolvedConfig::default();
        let locator = build_locator(&config, Some(0.95)).unwrap();
        assert_eq!(locator.options().typo_threshold, 0.95);
        assert_eq!(locator.options().gap_factor, config.locate.gap_factor);

        assert!(build_locator(&config, Some(2.0)).is_err());
    }

    #[tokio::test]
    async fn test_read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/quote-anchor/source.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read source file"));
    }
}
