use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use catstats::config::CatstatsConfig;
use catstats::{process_payload_with_configs, sample_payload};
use clap::Parser;
use serde_json::Value;

/// Recompute Commons category statistics from a dashboard payload.
#[derive(Parser)]
#[command(name = "catstats")]
#[command(author, version, about)]
struct Cli {
    /// Payload JSON file, or `-` for stdin
    payload: Option<PathBuf>,

    /// Run the bundled sample payload instead of reading one
    #[arg(long, conflicts_with = "payload")]
    sample: bool,

    /// Category label for the report (falls back to the payload's own)
    #[arg(short, long, default_value = "")]
    category: String,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => CatstatsConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CatstatsConfig::default(),
    };

    let payload = if cli.sample {
        let category = if cli.category.is_empty() {
            "Sample_category"
        } else {
            cli.category.as_str()
        };
        sample_payload(category)
    } else {
        match &cli.payload {
            Some(path) => read_payload(path)?,
            None => bail!("no payload given; pass a file, `-` for stdin, or --sample"),
        }
    };

    let report = process_payload_with_configs(
        &payload,
        &cli.category,
        &config.to_ingest_config(),
        &config.to_aggregate_config(),
    )?;

    let out = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading payload {}", path.display()))?
    };
    serde_json::from_str(&text).context("payload is not valid JSON")
}
