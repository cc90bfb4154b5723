//! Probe command-line harness.
//!
//! Wires configuration, the suite source, the reqwest executor and the
//! report renderers together. The binary in `main.rs` only parses flags,
//! sets up logging and maps the result to an exit code.

pub mod cli;
pub mod settings;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use probe_application::TestRunner;
use probe_domain::{Report, SuiteDefinition, presets};
use probe_infrastructure::{ReqwestExecutor, load_suite, render_json, render_text, save_suite};
use tracing::info;

pub use cli::Cli;
pub use settings::{OutputFormat, Overrides, Settings};

/// Result of one invocation.
#[derive(Debug)]
pub struct Completed {
    /// Text to print on stdout.
    pub rendered: String,
    /// Whether every case passed. `true` when nothing was run.
    pub all_passed: bool,
    /// The report, if a suite ran.
    pub report: Option<Report>,
}

/// Runs one invocation described by `cli`.
///
/// # Errors
///
/// Returns an error for invalid settings, an unreadable suite, an invalid
/// base URL or a report that cannot be written. Failing test cases are
/// not errors.
pub async fn run(cli: &Cli) -> anyhow::Result<Completed> {
    let settings =
        Settings::load(cli.config.as_deref(), &cli.overrides()).context("invalid configuration")?;

    if let Some(path) = &cli.export_preset {
        let suite = presets::lost_and_found()?;
        save_suite(path, &suite)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "exported preset suite");
        return Ok(Completed {
            rendered: format!("Wrote {} test cases to {}\n", suite.len(), path.display()),
            all_passed: true,
            report: None,
        });
    }

    let suite = match &cli.suite {
        Some(path) => load_suite(path)
            .await
            .with_context(|| format!("failed to load suite {}", path.display()))?,
        None => presets::lost_and_found()?,
    };

    let report = run_suite(suite, &settings, cli.base_url.is_some(), cli.timeout_ms.is_some())
        .await?;

    let rendered = match settings.format {
        OutputFormat::Text => render_text(&report, settings.verbose),
        OutputFormat::Json => render_json(&report)?,
    };

    if let Some(path) = &cli.output {
        tokio::fs::write(path, &rendered)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(Completed {
        rendered,
        all_passed: report.all_passed(),
        report: Some(report),
    })
}

/// Runs `suite` with the given settings.
///
/// Flags passed explicitly on the command line win over values carried by
/// the suite; otherwise the suite's own base URL and timeout win over the
/// settings.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the suite does
/// not form a valid runner.
pub async fn run_suite(
    mut suite: SuiteDefinition,
    settings: &Settings,
    base_url_forced: bool,
    timeout_forced: bool,
) -> anyhow::Result<Report> {
    if base_url_forced {
        suite.base_url = None;
    }
    let timeout_ms = match suite.timeout_ms {
        Some(timeout_ms) if !timeout_forced => timeout_ms,
        _ => settings.timeout_ms,
    };

    info!(suite = %suite.name, cases = suite.len(), timeout_ms, "loaded suite");

    let executor = Arc::new(ReqwestExecutor::with_timeout(Duration::from_millis(
        timeout_ms,
    ))?);
    let runner = TestRunner::from_suite(suite, &settings.base_url, executor)
        .context("invalid suite")?
        .with_concurrency(settings.concurrency);

    Ok(runner.run_all().await?)
}
