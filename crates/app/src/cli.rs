//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::{OutputFormat, Overrides};

/// Run HTTP-contract test suites against a service.
///
/// Without `--suite`, the built-in Lost & Found suite runs.
#[derive(Debug, Clone, Parser)]
#[command(name = "probe", version, about)]
pub struct Cli {
    /// Suite file to run (`.json`, `.yaml` or `.yml`).
    #[arg(short, long, value_name = "FILE")]
    pub suite: Option<PathBuf>,

    /// Settings file; defaults to `probe.toml` or `probe.yaml` when present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Service root, e.g. `http://localhost:18080`. Wins over the suite's own.
    #[arg(short = 'u', long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(short, long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Cases allowed in flight at once.
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<u64>,

    /// Report format.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Also write the report to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print status, body and failure reason for every case.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the built-in suite to FILE and exit without running it.
    #[arg(long, value_name = "FILE", conflicts_with = "suite")]
    pub export_preset: Option<PathBuf>,
}

impl Cli {
    /// Settings layer contributed by the flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            concurrency: self.concurrency,
            format: self.format,
            verbose: self.verbose,
        }
    }
}
