//! Layered runtime settings.
//!
//! Sources, lowest precedence first:
//!
//! | Layer | Example |
//! |-------|---------|
//! | built-in defaults | `base_url = http://localhost:18080` |
//! | `probe.toml` / `probe.yaml` in the working directory, or `--config FILE` | `timeout_ms = 5000` |
//! | `PROBE_*` environment variables | `PROBE_CONCURRENCY=4` |
//! | command-line flags | `--format json` |

use std::collections::HashMap;
use std::path::Path;

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use probe_domain::presets::LOST_AND_FOUND_BASE_URL;
use serde::Deserialize;

/// Name searched for in the working directory, without extension.
pub const DEFAULT_CONFIG_NAME: &str = "probe";

/// Prefix of the environment variables that feed the settings.
pub const ENV_PREFIX: &str = "PROBE";

/// Upper bound for `concurrency`.
pub const MAX_CONCURRENCY: usize = 256;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Console summary.
    #[default]
    Text,
    /// Pretty-printed JSON report.
    Json,
}

impl OutputFormat {
    /// Lowercase name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Root URL used when the suite does not name one.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Cases allowed in flight at once.
    pub concurrency: usize,
    /// Report format.
    pub format: OutputFormat,
    /// Print per-case details before the summary.
    pub verbose: bool,
}

/// Values given on the command line. `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--base-url`
    pub base_url: Option<String>,
    /// `--timeout-ms`
    pub timeout_ms: Option<u64>,
    /// `--concurrency`
    pub concurrency: Option<u64>,
    /// `--format`
    pub format: Option<OutputFormat>,
    /// `--verbose`; a flag can only switch verbosity on.
    pub verbose: bool,
}

impl Settings {
    /// Loads settings from every layer.
    ///
    /// With `config_file`, that file must exist; otherwise `probe.*` in the
    /// working directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value is invalid.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(config_file, None, overrides)
    }

    /// Same as [`Settings::load`] but reads variables from `env` instead of
    /// the process environment when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value is invalid.
    pub fn load_with_env(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let mut builder = Config::builder()
            .set_default("base_url", LOST_AND_FOUND_BASE_URL)?
            .set_default("timeout_ms", 30_000_u64)?
            .set_default("concurrency", 1_u64)?
            .set_default("format", OutputFormat::Text.as_str())?
            .set_default("verbose", false)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("base_url", overrides.base_url.clone())?
            .set_override_option("timeout_ms", overrides.timeout_ms)?
            .set_override_option("concurrency", overrides.concurrency)?
            .set_override_option("format", overrides.format.map(OutputFormat::as_str))?;

        if overrides.verbose {
            builder = builder.set_override("verbose", true)?;
        }

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::Message(format!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                self.concurrency
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let file = toml_file("");
        let settings =
            Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default()).unwrap();

        assert_eq!(
            settings,
            Settings {
                base_url: "http://localhost:18080".to_string(),
                timeout_ms: 30_000,
                concurrency: 1,
                format: OutputFormat::Text,
                verbose: false,
            }
        );
    }

    #[test]
    fn test_layer_precedence() {
        let file = toml_file("base_url = \"http://file:1\"\ntimeout_ms = 5000\nconcurrency = 2\n");
        let vars = env(&[("PROBE_TIMEOUT_MS", "7000"), ("PROBE_FORMAT", "json")]);
        let overrides = Overrides {
            concurrency: Some(8),
            ..Overrides::default()
        };

        let settings = Settings::load_with_env(Some(file.path()), vars, &overrides).unwrap();

        assert_eq!(settings.base_url, "http://file:1");
        assert_eq!(settings.timeout_ms, 7000);
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_cli_beats_env() {
        let file = toml_file("");
        let vars = env(&[("PROBE_BASE_URL", "http://env:2"), ("PROBE_VERBOSE", "false")]);
        let overrides = Overrides {
            base_url: Some("http://cli:3".to_string()),
            format: Some(OutputFormat::Json),
            verbose: true,
            ..Overrides::default()
        };

        let settings = Settings::load_with_env(Some(file.path()), vars, &overrides).unwrap();

        assert_eq!(settings.base_url, "http://cli:3");
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.verbose);
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let file = toml_file("concurrency = 0\n");
        let result = Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_huge_concurrency() {
        let file = toml_file("");
        let overrides = Overrides {
            concurrency: Some(u64::MAX),
            ..Overrides::default()
        };
        let result = Settings::load_with_env(Some(file.path()), env(&[]), &overrides);
        assert!(result.is_err());

        let overrides = Overrides {
            concurrency: Some(257),
            ..Overrides::default()
        };
        let result = Settings::load_with_env(Some(file.path()), env(&[]), &overrides);
        assert!(result.unwrap_err().to_string().contains("between 1 and 256"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Settings::load_with_env(
            Some(Path::new("/nonexistent/probe.toml")),
            env(&[]),
            &Overrides::default(),
        );
        assert!(result.is_err());
    }
}
