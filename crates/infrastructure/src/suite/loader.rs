//! Reading and writing suite files.

use std::path::{Path, PathBuf};

use probe_domain::SuiteDefinition;
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json, to_json_stable};

/// On-disk suite format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl SuiteFormat {
    /// Picks the format from a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`SuiteLoadError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, SuiteLoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(SuiteLoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Error type for suite file operations.
#[derive(Debug, thiserror::Error)]
pub enum SuiteLoadError {
    /// Reading or writing the file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The extension is neither JSON nor YAML.
    #[error("unsupported suite format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    /// JSON content is invalid.
    #[error(transparent)]
    Json(#[from] SerializationError),

    /// YAML content is invalid.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parses suite text in the given format.
///
/// # Errors
///
/// Returns an error if the text does not describe a suite.
pub fn parse_suite(text: &str, format: SuiteFormat) -> Result<SuiteDefinition, SuiteLoadError> {
    match format {
        SuiteFormat::Json => Ok(from_json(text)?),
        SuiteFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

/// Renders a suite in the given format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_suite(suite: &SuiteDefinition, format: SuiteFormat) -> Result<String, SuiteLoadError> {
    match format {
        SuiteFormat::Json => Ok(to_json_stable(suite)?),
        SuiteFormat::Yaml => Ok(serde_yaml::to_string(suite)?),
    }
}

/// Loads a suite file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unknown extension
/// or does not parse.
pub async fn load_suite(path: &Path) -> Result<SuiteDefinition, SuiteLoadError> {
    let format = SuiteFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .await
        .map_err(|source| SuiteLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let suite = parse_suite(&text, format)?;
    debug!(path = %path.display(), cases = suite.len(), "loaded suite");
    Ok(suite)
}

/// Writes a suite file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the extension is unknown or the file cannot be
/// written.
pub async fn save_suite(path: &Path, suite: &SuiteDefinition) -> Result<(), SuiteLoadError> {
    let format = SuiteFormat::from_path(path)?;
    let text = render_suite(suite, format)?;
    let io_error = |source| SuiteLoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    fs::write(path, text).await.map_err(io_error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use probe_domain::presets::lost_and_found;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SuiteFormat::from_path(Path::new("suite.JSON")).unwrap(),
            SuiteFormat::Json
        );
        assert_eq!(
            SuiteFormat::from_path(Path::new("a/b/suite.yml")).unwrap(),
            SuiteFormat::Yaml
        );
        assert!(matches!(
            SuiteFormat::from_path(Path::new("suite.toml")),
            Err(SuiteLoadError::UnsupportedFormat(_))
        ));
        assert!(SuiteFormat::from_path(Path::new("suite")).is_err());
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json = r#"{
            "name": "search",
            "cases": [{
                "name": "search_by_desc",
                "method": "POST",
                "path": "/search",
                "body": {"type": "json", "value": {"description": "wallet"}},
                "expect": {"type": "status_equals", "code": 200}
            }]
        }"#;
        let yaml = r"
name: search
cases:
  - name: search_by_desc
    method: POST
    path: /search
    body:
      type: json
      value:
        description: wallet
    expect:
      type: status_equals
      code: 200
";

        let from_json = parse_suite(json, SuiteFormat::Json).unwrap();
        let from_yaml = parse_suite(yaml, SuiteFormat::Yaml).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_suite("cases: [", SuiteFormat::Yaml);
        assert!(matches!(result, Err(SuiteLoadError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_save_then_load_yaml() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("suites").join("lost-and-found.yaml");
        let suite = lost_and_found().unwrap();

        save_suite(&path, &suite).await.unwrap();
        let loaded = load_suite(&path).await.unwrap();

        assert_eq!(loaded, suite);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = load_suite(&temp_dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(SuiteLoadError::Io { .. })));
    }
}
