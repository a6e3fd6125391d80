//! Grounding CLI subcommands.
//!
//! Provides commands to:
//! - `ground`: Locate every extraction in a source and write grounded records
//! - `verify`: Check grounded records against the current source

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{build_locator, read_source};
use crate::config;
use crate::evidence::{
    compute_hash, ground_with_digest, verify, Extraction, GroundedExtraction, SpanCheck, Status,
};
use crate::locate::Locator;

/// Parse a JSONL file, skipping blank and malformed lines
async fn load_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    Ok(parse_jsonl(&content, path))
}

fn parse_jsonl<T: DeserializeOwned>(content: &str, path: &Path) -> Vec<T> {
    let mut items = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(line) {
            Ok(item) => items.push(item),
            Err(e) => warn!("Skipping {}:{}: {}", path.display(), idx + 1, e),
        }
    }

    items
}

/// Append records to a JSONL file with file locking
fn append_records(output_path: &Path, records: &[GroundedExtraction]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)
        .with_context(|| format!("Failed to open output file: {}", output_path.display()))?;

    // Acquire exclusive lock
    file.lock_exclusive()
        .with_context(|| format!("Failed to acquire file lock on {}", output_path.display()))?;

    let mut file = file;
    for record in records {
        let json = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(file, "{}", json).context("Failed to write record")?;
    }
    file.flush().context("Failed to flush records")?;

    // Lock is released when file is dropped
    Ok(())
}

/// Ground extractions against a source, in input order
pub async fn ground_all(
    extractions: Vec<Extraction>,
    source: Arc<str>,
    locator: Locator,
    anchor_window: usize,
) -> Result<Vec<GroundedExtraction>> {
    let digest: Arc<str> = compute_hash(source.as_bytes()).into();

    let handles: Vec<_> = extractions
        .into_iter()
        .map(|extraction| {
            let source = Arc::clone(&source);
            let digest = Arc::clone(&digest);
            tokio::task::spawn_blocking(move || {
                ground_with_digest(&extraction, &source, &digest, &locator, anchor_window)
            })
        })
        .collect();

    let mut records = Vec::with_capacity(handles.len());
    for handle in handles {
        let record = handle.await.context("Grounding task failed")??;
        records.push(record);
    }

    Ok(records)
}

/// Execute the `ground` command
pub async fn execute_ground(
    source_path: &Path,
    input_path: &Path,
    output_path: Option<&Path>,
    threshold: Option<f64>,
) -> Result<()> {
    let config = config::config()?;
    let locator = build_locator(config, threshold)?;

    let source: Arc<str> = read_source(source_path).await?.into();
    let extractions: Vec<Extraction> = load_jsonl(input_path).await?;

    info!(
        count = extractions.len(),
        source = %source_path.display(),
        "Grounding extractions"
    );

    let records = ground_all(extractions, source, locator, config.anchor_window)
        .await
        .with_context(|| format!("Failed to ground against {}", source_path.display()))?;

    let resolved = records
        .iter()
        .filter(|r| r.status == Status::Resolved)
        .count();

    match output_path {
        Some(path) => append_records(path, &records)?,
        None => {
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
    }

    // stdout may carry the records, so the summary goes to stderr
    eprintln!();
    eprintln!("Summary:");
    eprintln!("  Total:      {}", records.len());
    eprintln!("  Resolved:   {}", resolved);
    eprintln!("  Unresolved: {}", records.len() - resolved);

    Ok(())
}

/// Counts from a verification pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VerifySummary {
    pub valid: usize,
    pub stale: usize,
    pub out_of_bounds: usize,
    pub unresolved: usize,
}

impl VerifySummary {
    fn record(&mut self, check: SpanCheck) {
        match check {
            SpanCheck::Valid => self.valid += 1,
            SpanCheck::Stale => self.stale += 1,
            SpanCheck::OutOfBounds => self.out_of_bounds += 1,
            SpanCheck::Unresolved => self.unresolved += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.stale + self.out_of_bounds + self.unresolved
    }

    pub fn needs_regrounding(&self) -> bool {
        self.stale > 0 || self.out_of_bounds > 0
    }
}

/// Verify records against the source, printing problems as they are found
pub fn verify_all(records: &[GroundedExtraction], source: &str) -> VerifySummary {
    let digest = compute_hash(source.as_bytes());
    let mut summary = VerifySummary::default();

    for record in records {
        let check = verify(record, source, &digest);
        if matches!(check, SpanCheck::Stale | SpanCheck::OutOfBounds) {
            if let Some(span) = &record.span {
                println!(
                    "    {}: {} (bytes {}:{})",
                    check.as_str().to_uppercase(),
                    record.id,
                    span.utf8_byte_offset[0],
                    span.utf8_byte_offset[1]
                );
            }
        }
        summary.record(check);
    }

    summary
}

/// Execute the `verify` command
pub async fn execute_verify(source_path: &Path, input_path: &Path) -> Result<()> {
    let source = read_source(source_path).await?;
    let records: Vec<GroundedExtraction> = load_jsonl(input_path).await?;

    println!("Verifying {} against {}", input_path.display(), source_path.display());
    println!();

    if records.is_empty() {
        println!("No grounded records found");
        return Ok(());
    }

    let summary = verify_all(&records, &source);

    println!();
    println!("Summary:");
    println!("  Total records:  {}", summary.total());
    println!("  Valid:          {}", summary.valid);
    println!("  Stale:          {}", summary.stale);
    println!("  Out of bounds:  {}", summary.out_of_bounds);
    println!("  Unresolved:     {}", summary.unresolved);

    if summary.needs_regrounding() {
        println!();
        println!("Some records need re-grounding due to source changes.");
    }

    Ok(())
}
