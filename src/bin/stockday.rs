// src/bin/stockday.rs
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockday::loader::{load_from_path, InvalidRowPolicy, LoadOptions};
use stockday::prelude::*;

/// Classify daily stock prices against candlestick patterns
#[derive(Debug, Parser)]
#[command(name = "stockday", version)]
struct Cli {
    /// Price file with `DD/MM/YYYY,open,high,low,close` rows
    #[arg(required_unless_present = "list")]
    file: Option<PathBuf>,

    /// Pattern to search for
    #[arg(short, long, default_value = "hammer", conflicts_with = "all")]
    pattern: String,

    /// Search for every builtin pattern
    #[arg(long)]
    all: bool,

    /// List available patterns and exit
    #[arg(long)]
    list: bool,

    /// The file has no header line
    #[arg(long)]
    no_header: bool,

    /// Report invalid rows and continue instead of aborting
    #[arg(long)]
    skip_invalid: bool,

    /// Evaluate windows in parallel
    #[arg(long)]
    parallel: bool,

    /// Print one JSON object per match
    #[arg(long)]
    json: bool,

    /// Detector parameter override for --pattern, e.g. `shadow_factor=2.5`
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    params: Vec<(String, Decimal)>,
}

fn parse_param(s: &str) -> std::result::Result<(String, Decimal), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    let value = value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn build_classifier(cli: &Cli) -> Result<Classifier> {
    let builder = ClassifierBuilder::new().parallel(cli.parallel);

    let builder = if cli.params.is_empty() {
        builder.with_all_defaults()
    } else {
        if cli.all {
            bail!("--param applies to a single --pattern, not --all");
        }
        let params: HashMap<&str, Decimal> =
            cli.params.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        let detector = BuiltinDetector::with_params(&cli.pattern, &params)?;
        builder.add_checked(detector)?
    };

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let classifier = build_classifier(&cli)?;

    if cli.list {
        for id in classifier.patterns() {
            if let Some(detector) = classifier.detector(id.as_str()) {
                let meta = detector.metadata();
                println!(
                    "{:<22} {:<10} {:?}  {}",
                    meta.name, meta.category, meta.direction, meta.description
                );
            }
        }
        return Ok(());
    }

    let Some(path) = cli.file.as_ref() else {
        bail!("no input file given");
    };
    let options = LoadOptions {
        has_header: !cli.no_header,
        on_invalid: if cli.skip_invalid {
            InvalidRowPolicy::Skip
        } else {
            InvalidRowPolicy::Abort
        },
    };
    let report = load_from_path(path, options)
        .with_context(|| format!("failed to load {}", path.display()))?;

    for rejected in &report.rejected {
        eprintln!("skipped: {rejected}");
    }
    info!(records = report.records.len(), "loaded price file");

    let matches = if cli.all {
        classifier.scan_all(&report.records)
    } else {
        classifier.find_matches(&cli.pattern, &report.records)?
    };

    if matches.is_empty() {
        eprintln!("no patterns found");
    }
    for m in &matches {
        if cli.json {
            println!("{}", serde_json::to_string(m)?);
        } else {
            println!("{m}");
        }
    }

    Ok(())
}
