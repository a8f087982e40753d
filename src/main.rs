use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use trailflag::formats::edge_flags::{self, EdgeFlags, SpeedEncoder, WayFlags};
use trailflag::{AcceptDecision, HikeProfile, PriorityCode, Properties, WayTags};

#[derive(Parser)]
#[command(name = "trailflag")]
#[command(about = "Hiking acceptance and priority flags for OSM ways", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify ways from a JSON-lines tag dump
    Classify {
        /// Input file, one {"id": .., "tags": {..}} object per line
        input: PathBuf,

        /// Profile properties, "key=value|key=value"
        #[arg(long)]
        properties: Option<String>,

        /// Write a packed edge_flags.bin artifact for the accepted ways
        #[arg(long)]
        flags: Option<PathBuf>,
    },
    /// Verify an edge_flags.bin artifact
    Verify {
        /// edge_flags.bin file
        flags: PathBuf,
    },
}

#[derive(Deserialize)]
struct WayRecord {
    id: i64,
    #[serde(default)]
    tags: WayTags,
}

#[derive(Serialize)]
struct WayResult {
    id: i64,
    decision: AcceptDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<PriorityCode>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Classify {
            input,
            properties,
            flags,
        } => run_classify(input, properties, flags),
        Commands::Verify { flags } => run_verify(flags),
    }
}

fn run_classify(
    input: PathBuf,
    properties: Option<String>,
    flags_out: Option<PathBuf>,
) -> Result<()> {
    let props = properties
        .as_deref()
        .map(Properties::parse_str)
        .unwrap_or_default();
    let profile = HikeProfile::from_properties(&props);

    if let Some(notice) = profile.advisory() {
        tracing::warn!("{notice}");
    }

    let file = File::open(&input).with_context(|| format!("failed to open {}", input.display()))?;
    let ways = BufReader::new(file)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line?;
            serde_json::from_str::<WayRecord>(&line)
                .with_context(|| format!("bad way record on line {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    // The per-way calls are pure; fan out across the batch.
    let results: Vec<WayResult> = ways
        .par_iter()
        .map(|way| {
            let decision = profile.decide(&way.tags);
            let priority = decision.is_accepted().then(|| profile.resolve(&way.tags));
            WayResult {
                id: way.id,
                decision,
                priority,
            }
        })
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for result in &results {
        serde_json::to_writer(&mut out, result)?;
        writeln!(out)?;
    }

    if let Some(path) = flags_out {
        let speed = SpeedEncoder::from_config(profile.config());
        let records: Vec<WayFlags> = ways
            .iter()
            .zip(&results)
            .filter(|(_, result)| result.decision.is_accepted())
            .map(|(way, result)| WayFlags {
                way_id: way.id,
                flags: EdgeFlags::pack(
                    result.decision,
                    result.priority.unwrap_or(PriorityCode::Unchanged),
                    way.tags.max_speed(),
                    &speed,
                ),
            })
            .collect();

        edge_flags::write(&path, &profile, &records)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(count = records.len(), path = %path.display(), "wrote flags artifact");
    }

    Ok(())
}

fn run_verify(flags: PathBuf) -> Result<()> {
    let profile = HikeProfile::default();
    let records = edge_flags::read(&flags, &profile)
        .with_context(|| format!("failed to verify {}", flags.display()))?;
    println!("  ✓ {} verified ({} ways)", flags.display(), records.len());
    Ok(())
}
