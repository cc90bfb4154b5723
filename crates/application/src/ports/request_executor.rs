//! Request executor port

use std::future::Future;

use probe_domain::{BaseUrl, Outcome, TestCase};

/// Port for sending one test case's request.
///
/// This trait abstracts the HTTP client implementation, allowing the
/// runner to be independent of specific HTTP libraries.
///
/// Implementations never fail: connection problems, timeouts and
/// malformed URLs are reported through [`Outcome::transport_error`] so one
/// bad call cannot abort a run. Each call is a single attempt.
pub trait RequestExecutor: Send + Sync {
    /// Sends `case` to `base_url` joined with the case's path.
    fn execute(&self, base_url: &BaseUrl, case: &TestCase)
    -> impl Future<Output = Outcome> + Send;
}
