//! Request executor implementation using reqwest.
//!
//! This adapter implements the `RequestExecutor` port using the reqwest
//! library. Every failure to complete an exchange is folded into the
//! returned [`Outcome`] as a [`TransportError`].

use std::collections::BTreeMap;
use std::error::Error as _;
use std::io;
use std::time::{Duration, Instant};

use probe_application::RequestExecutor;
use probe_domain::{BaseUrl, HttpMethod, Outcome, TestCase, TransportError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use tracing::{debug, warn};

use crate::http::build_body;

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Error creating the underlying HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorBuildError {
    /// reqwest refused the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Request executor backed by `reqwest::Client`.
///
/// One attempt per call, no retries. Connections are pooled by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    timeout: Duration,
}

impl ReqwestExecutor {
    /// Per-request timeout used by [`ReqwestExecutor::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates an executor with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "probe/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, ExecutorBuildError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Creates an executor with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ExecutorBuildError> {
        let client = Client::builder()
            .user_agent(concat!("probe/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Creates an executor around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Configured per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn send(
        &self,
        base_url: &BaseUrl,
        case: &TestCase,
        start: Instant,
    ) -> Result<Outcome, TransportError> {
        let raw_url = base_url.join(case.path());
        let url = Url::parse(&raw_url).map_err(|e| TransportError::InvalidUrl {
            message: format!("{e}: {raw_url}"),
        })?;

        let body = build_body(case.body()).map_err(|e| TransportError::InvalidRequest {
            message: e.to_string(),
        })?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(case.method()), url.clone())
            .timeout(self.timeout);

        for (name, value) in case.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // Implied content type only fills a gap; a declared one always wins
        if let Some(content_type) = body.content_type
            && !case.has_header(CONTENT_TYPE.as_str())
        {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if let Some(content) = body.content {
            builder = builder.body(content);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, &url, self.timeout_ms()))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let bytes = response.bytes().await.map_err(|e| TransportError::Body {
            message: error_chain(&e),
        })?;

        Ok(Outcome::response(
            status,
            headers,
            String::from_utf8_lossy(&bytes),
            elapsed_ms(start),
        ))
    }
}

impl RequestExecutor for ReqwestExecutor {
    async fn execute(&self, base_url: &BaseUrl, case: &TestCase) -> Outcome {
        let start = Instant::now();

        match self.send(base_url, case, start).await {
            Ok(outcome) => {
                debug!(
                    case = case.name(),
                    status = ?outcome.status_code,
                    duration_ms = outcome.duration_ms,
                    "response received"
                );
                outcome
            }
            Err(error) => {
                warn!(case = case.name(), %error, "request did not complete");
                Outcome::transport_failure(error, elapsed_ms(start))
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Renders an error and all of its sources, outermost first.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Finds an I/O error kind anywhere in the source chain.
fn io_error_kind(error: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
        source = cause.source();
    }
    None
}

/// Maps reqwest errors to domain `TransportError`.
fn map_error(error: &reqwest::Error, url: &Url, timeout_ms: u64) -> TransportError {
    let message = error_chain(error);
    let lowered = message.to_lowercase();
    let host = url.host_str().unwrap_or("unknown").to_string();

    if error.is_timeout() {
        return TransportError::Timeout { timeout_ms };
    }

    if error.is_builder() {
        return TransportError::InvalidRequest { message };
    }

    if error.is_connect() {
        if io_error_kind(error) == Some(io::ErrorKind::ConnectionRefused)
            || lowered.contains("refused")
        {
            return TransportError::ConnectionRefused {
                host,
                port: url.port_or_known_default().unwrap_or(80),
            };
        }
        if lowered.contains("dns") || lowered.contains("resolve") {
            return TransportError::Dns { host, message };
        }
        if lowered.contains("certificate") || lowered.contains("tls") {
            return TransportError::Tls { message };
        }
        return TransportError::ConnectionFailed { message };
    }

    if error.is_redirect() {
        return TransportError::other(format!("stopped after {MAX_REDIRECTS} redirects: {message}"));
    }

    if error.is_body() || error.is_decode() {
        return TransportError::Body { message };
    }

    TransportError::Other { message }
}
