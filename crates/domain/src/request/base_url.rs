//! Target service root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Validated root URL of the service under test (scheme, host, optional
/// port and path prefix).
///
/// Test case paths are appended to it verbatim; the only normalization is
/// that a trailing `/` on the root is dropped so `"/report"` does not
/// produce a doubled slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl {
    root: String,
}

impl BaseUrl {
    /// Parses and validates a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the input is not an absolute
    /// `http`/`https` URL with a host, or if it carries a query or fragment.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let url = Url::parse(trimmed).map_err(|e| DomainError::InvalidUrl(format!("{e}: {trimmed}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{}': {trimmed}",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DomainError::InvalidUrl(format!("missing host: {trimmed}")));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(DomainError::InvalidUrl(format!(
                "base URL must not carry a query or fragment: {trimmed}"
            )));
        }

        Ok(Self {
            root: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the root without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// Appends `path` verbatim to the root.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.root)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)
    }
}

impl FromStr for BaseUrl {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<BaseUrl> for String {
    fn from(value: BaseUrl) -> Self {
        value.root
    }
}
