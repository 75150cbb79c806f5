//! Batch coreference resolver
//!
//! # Usage
//!
//! ```bash
//! coref-resolve files.list out/
//! ```
//!
//! Every path listed in `files.list` (one per line) is resolved and written
//! to `out/<name>.response`. Configuration comes from `COREF_*` environment
//! variables or a `.env` file; logging honours `RUST_LOG`.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use markup_coref::{BatchResolver, ResolverConfig};

#[derive(Parser, Debug)]
#[command(name = "coref-resolve")]
#[command(version)]
#[command(about = "Resolve noun-phrase coreference in COREF-annotated documents", long_about = None)]
struct Cli {
    /// File listing one input document path per line
    #[arg(value_name = "LIST_FILE")]
    list_file: PathBuf,

    /// Directory receiving one response file per input document
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Maximum number of documents resolved at once
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ResolverConfig::from_env().context("invalid configuration")?;
    if let Some(jobs) = cli.jobs {
        config = config.with_max_concurrency(jobs);
    }

    let batch = BatchResolver::new(config).context("cannot start batch")?;
    let report = batch
        .run(&cli.list_file, &cli.output_dir)
        .await
        .with_context(|| format!("batch over {} failed", cli.list_file.display()))?;

    for failure in &report.failed {
        eprintln!("{}: {}", failure.source.display(), failure.error);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
