//! Test runner.
//!
//! Owns an ordered registry of test cases, sends each one through a
//! [`RequestExecutor`], applies its expectation and aggregates a [`Report`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use chrono::Utc;
use probe_domain::{
    BaseUrl, Outcome, PredicateError, Report, ReportEntry, SuiteDefinition, TestCase,
    TransportError,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::RequestExecutor;

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const FINALIZED: u8 = 2;

/// Lifecycle of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// `run_all` has never been called.
    NotStarted,
    /// A run is in flight.
    Running,
    /// At least one run has completed (or was dropped) and none is in flight.
    Finalized,
}

/// Marks the runner as running for as long as it lives.
struct RunGuard<'a> {
    state: &'a AtomicU8,
}

impl<'a> RunGuard<'a> {
    fn acquire(state: &'a AtomicU8) -> ApplicationResult<Self> {
        state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != RUNNING).then_some(RUNNING)
            })
            .map_err(|_| ApplicationError::RunInProgress)?;
        Ok(Self { state })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.store(FINALIZED, Ordering::Release);
    }
}

/// Runs registered test cases against one service root.
///
/// # Example
///
/// ```ignore
/// let executor = Arc::new(ReqwestExecutor::new()?);
/// let mut runner = TestRunner::new("http://localhost:18080", executor)?;
/// runner.register(case)?;
///
/// let report = runner.run_all().await?;
/// assert!(report.all_passed());
/// ```
pub struct TestRunner<E: RequestExecutor> {
    base_url: BaseUrl,
    executor: Arc<E>,
    cases: Vec<TestCase>,
    concurrency: usize,
    state: AtomicU8,
}

impl<E: RequestExecutor + 'static> TestRunner<E> {
    /// Creates a runner targeting `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute `http`/`https` URL.
    pub fn new(base_url: &str, executor: Arc<E>) -> ApplicationResult<Self> {
        let base_url =
            BaseUrl::parse(base_url).map_err(|e| ApplicationError::InvalidBaseUrl(e.to_string()))?;
        Ok(Self::with_base_url(base_url, executor))
    }

    /// Creates a runner from an already validated base URL.
    #[must_use]
    pub const fn with_base_url(base_url: BaseUrl, executor: Arc<E>) -> Self {
        Self {
            base_url,
            executor,
            cases: Vec::new(),
            concurrency: 1,
            state: AtomicU8::new(NOT_STARTED),
        }
    }

    /// Creates a runner with every case of `suite` registered.
    ///
    /// The suite's own base URL wins over `fallback_base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or a case fails
    /// registration.
    pub fn from_suite(
        suite: SuiteDefinition,
        fallback_base_url: &str,
        executor: Arc<E>,
    ) -> ApplicationResult<Self> {
        let mut runner = match suite.base_url {
            Some(base_url) => Self::with_base_url(base_url, executor),
            None => Self::new(fallback_base_url, executor)?,
        };
        runner.register_all(suite.cases)?;
        Ok(runner)
    }

    /// Sets how many cases may be in flight at once.
    ///
    /// `1` (the default) runs strictly one after another. Report order is
    /// registration order either way. Values above
    /// [`Semaphore::MAX_PERMITS`] are clamped.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    /// Adds a test case to the end of the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::DuplicateTestCase`] if the name is taken,
    /// or [`ApplicationError::Domain`] if the case is invalid. The registry
    /// is unchanged on error.
    pub fn register(&mut self, case: TestCase) -> ApplicationResult<()> {
        case.validate()?;
        if self.cases.iter().any(|existing| existing.name() == case.name()) {
            return Err(ApplicationError::DuplicateTestCase(case.name().to_string()));
        }
        debug!(case = case.name(), "registered test case");
        self.cases.push(case);
        Ok(())
    }

    /// Registers every case in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`TestRunner::register`]. Cases before the failing one stay
    /// registered.
    pub fn register_all(
        &mut self,
        cases: impl IntoIterator<Item = TestCase>,
    ) -> ApplicationResult<()> {
        cases.into_iter().try_for_each(|case| self.register(case))
    }

    /// Runs every registered case and returns the report.
    ///
    /// Individual failures never abort the run: transport errors, failed
    /// expectations and malformed expectations all become failing entries.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::RunInProgress`] if this runner is
    /// already running.
    pub async fn run_all(&self) -> ApplicationResult<Report> {
        let _guard = RunGuard::acquire(&self.state)?;

        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let start = Instant::now();
        info!(
            %run_id,
            base_url = %self.base_url,
            cases = self.cases.len(),
            concurrency = self.concurrency,
            "starting run"
        );

        let outcomes = if self.concurrency > 1 {
            self.execute_concurrently().await
        } else {
            self.execute_sequentially().await
        };

        let entries: Vec<ReportEntry> = self
            .cases
            .iter()
            .zip(outcomes)
            .map(|(case, outcome)| judge(case, outcome))
            .collect();

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = Report::new(run_id, self.base_url.clone(), started_at, duration_ms, entries);
        info!(
            %run_id,
            passed = report.passed(),
            total = report.total(),
            duration_ms,
            "run finished"
        );
        Ok(report)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        match self.state.load(Ordering::Acquire) {
            NOT_STARTED => RunnerState::NotStarted,
            RUNNING => RunnerState::Running,
            _ => RunnerState::Finalized,
        }
    }

    /// Service root the runner targets.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(TestCase::name)
    }

    /// Number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    async fn execute_sequentially(&self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            let task = self.spawn_case(case, None);
            outcomes.push(task.join(case).await);
        }
        outcomes
    }

    async fn execute_concurrently(&self) -> Vec<Outcome> {
        let permits = Arc::new(Semaphore::new(
            self.concurrency.min(self.cases.len()).max(1),
        ));
        let tasks: Vec<CaseTask> = self
            .cases
            .iter()
            .map(|case| self.spawn_case(case, Some(Arc::clone(&permits))))
            .collect();

        // Joined in registration order; dropping `tasks` aborts whatever is left
        let mut outcomes = Vec::with_capacity(tasks.len());
        for (case, task) in self.cases.iter().zip(tasks) {
            outcomes.push(task.join(case).await);
        }
        outcomes
    }

    /// Runs one case on its own task so a panicking executor only takes
    /// that case down.
    fn spawn_case(&self, case: &TestCase, permits: Option<Arc<Semaphore>>) -> CaseTask {
        let executor = Arc::clone(&self.executor);
        let base_url = self.base_url.clone();
        let case = case.clone();

        CaseTask(tokio::spawn(async move {
            let _permit = match permits {
                Some(permits) => permits.acquire_owned().await.ok(),
                None => None,
            };
            debug!(case = case.name(), method = %case.method(), path = case.path(), "executing");
            executor.execute(&base_url, &case).await
        }))
    }
}

/// A spawned case, aborted when dropped before it is joined.
///
/// Cancelling `run_all` drops every pending task with it, so no request of
/// a cancelled run outlives the run.
struct CaseTask(JoinHandle<Outcome>);

impl CaseTask {
    async fn join(mut self, case: &TestCase) -> Outcome {
        match (&mut self.0).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(case = case.name(), %error, "executor task failed");
                Outcome::transport_failure(
                    TransportError::other(format!("executor task failed: {error}")),
                    0,
                )
            }
        }
    }
}

impl Drop for CaseTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Applies the case's expectation and records why it failed, if it did.
fn judge(case: &TestCase, outcome: Outcome) -> ReportEntry {
    let expectation = case.expect();
    let (passed, outcome) = match expectation.evaluate(&outcome) {
        Ok(true) => (true, outcome),
        Ok(false) => {
            let diagnostic = mismatch(&expectation.description(), &outcome);
            (false, outcome.with_diagnostic(diagnostic))
        }
        Err(error) => (false, outcome.with_diagnostic(predicate_failure(&error))),
    };

    debug!(
        case = case.name(),
        passed,
        status = ?outcome.status_code,
        "test case finished"
    );

    ReportEntry {
        name: case.name().to_string(),
        outcome,
        passed,
    }
}

fn mismatch(expected: &str, outcome: &Outcome) -> String {
    match (&outcome.transport_error, outcome.status_code) {
        (Some(error), _) => format!("expected {expected}, but {}: {error}", error.title()),
        (None, Some(status)) => format!("expected {expected}, got status {status}"),
        (None, None) => format!("expected {expected}, got no status"),
    }
}

fn predicate_failure(error: &PredicateError) -> String {
    format!("expectation could not be evaluated: {error}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use pretty_assertions::assert_eq;
    use probe_domain::Expectation;
    use serde_json::json;

    const BASE_URL: &str = "http://localhost:18080";

    /// Mock executor returning scripted outcomes by case name.
    ///
    /// Unscripted cases behave like an unreachable service.
    #[derive(Default)]
    struct ScriptedExecutor {
        outcomes: HashMap<String, Outcome>,
        delays: HashMap<String, Duration>,
        panics_on: Option<String>,
        calls: Mutex<Vec<String>>,
        completed: Arc<AtomicUsize>,
    }

    impl ScriptedExecutor {
        fn respond(mut self, name: &str, status: u16, body: &str) -> Self {
            self.outcomes.insert(
                name.to_string(),
                Outcome::response(status, BTreeMap::new(), body, 3),
            );
            self
        }

        fn delay(mut self, name: &str, millis: u64) -> Self {
            self.delays
                .insert(name.to_string(), Duration::from_millis(millis));
            self
        }

        fn panic_on(mut self, name: &str) -> Self {
            self.panics_on = Some(name.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }
    }

    fn refused() -> Outcome {
        Outcome::transport_failure(
            TransportError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 18080,
            },
            1,
        )
    }

    impl RequestExecutor for ScriptedExecutor {
        fn execute(
            &self,
            _base_url: &BaseUrl,
            case: &TestCase,
        ) -> impl Future<Output = Outcome> + Send {
            self.calls.lock().unwrap().push(case.name().to_string());
            let outcome = self.outcomes.get(case.name()).cloned();
            let delay = self.delays.get(case.name()).copied();
            let panics = self.panics_on.as_deref() == Some(case.name());
            let completed = Arc::clone(&self.completed);

            async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                if panics {
                    panic!("executor blew up");
                }
                completed.fetch_add(1, Ordering::SeqCst);
                outcome.unwrap_or_else(refused)
            }
        }
    }

    fn case(name: &str, path: &str, expect: Expectation) -> TestCase {
        TestCase::builder(name)
            .post(path)
            .json(json!({"description": "wallet"}))
            .expect(expect)
            .build()
            .unwrap()
    }

    fn lost_and_found_runner(executor: ScriptedExecutor) -> TestRunner<ScriptedExecutor> {
        let suite = probe_domain::presets::lost_and_found().unwrap();
        TestRunner::from_suite(suite, BASE_URL, Arc::new(executor)).unwrap()
    }

    #[test]
    fn test_new_rejects_malformed_base_url() {
        let result = TestRunner::new("localhost", Arc::new(ScriptedExecutor::default()));
        assert!(matches!(result, Err(ApplicationError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut runner = TestRunner::new(BASE_URL, Arc::new(ScriptedExecutor::default())).unwrap();

        runner
            .register(case("dup", "/report", Expectation::status(200)))
            .unwrap();
        let second = runner.register(case("dup", "/search", Expectation::status(400)));

        assert_eq!(
            second,
            Err(ApplicationError::DuplicateTestCase("dup".to_string()))
        );
        assert_eq!(runner.len(), 1);
        assert_eq!(runner.names().collect::<Vec<_>>(), ["dup"]);
    }

    #[test]
    fn test_register_all_stops_at_first_error() {
        let mut runner = TestRunner::new(BASE_URL, Arc::new(ScriptedExecutor::default())).unwrap();
        let result = runner.register_all([
            case("a", "/report", Expectation::success()),
            case("a", "/report", Expectation::success()),
            case("b", "/report", Expectation::success()),
        ]);

        assert!(result.is_err());
        assert_eq!(runner.names().collect::<Vec<_>>(), ["a"]);
    }

    #[tokio::test]
    async fn test_lost_and_found_all_pass() {
        let executor = ScriptedExecutor::default()
            .respond("report_ok", 200, "Item reported successfully")
            .respond("search_by_desc", 200, r#"{"results": []}"#)
            .respond("search_by_id", 200, r#"{"results": []}"#)
            .respond("bad_json", 400, "Bad Request");
        let runner = lost_and_found_runner(executor);

        let report = runner.run_all().await.unwrap();

        let summary: Vec<_> = report
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.outcome.status_code, e.passed))
            .collect();
        assert_eq!(
            summary,
            [
                ("report_ok", Some(200), true),
                ("search_by_desc", Some(200), true),
                ("search_by_id", Some(200), true),
                ("bad_json", Some(400), true),
            ]
        );
        assert!(report.all_passed());
        assert_eq!(report.base_url().as_str(), BASE_URL);
    }

    #[tokio::test]
    async fn test_bad_json_fails_when_service_accepts_it() {
        let executor = ScriptedExecutor::default().respond("bad_json", 200, "ok");
        let runner = lost_and_found_runner(executor);

        let report = runner.run_all().await.unwrap();
        let entry = report.entry("bad_json").unwrap();

        assert!(!entry.passed);
        assert_eq!(
            entry.outcome.diagnostic.as_deref(),
            Some("expected status = 400, got status 200")
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_stop_run() {
        let executor = ScriptedExecutor::default().respond("search_by_desc", 200, "{}");
        let runner = lost_and_found_runner(executor);

        let report = runner.run_all().await.unwrap();

        assert_eq!(report.total(), 4);
        let report_ok = report.entry("report_ok").unwrap();
        assert!(!report_ok.passed);
        assert_eq!(report_ok.outcome.status_code, None);
        assert!(report_ok.outcome.transport_error.is_some());
        assert!(report.entry("search_by_desc").unwrap().passed);
    }

    #[tokio::test]
    async fn test_runs_in_registration_order() {
        let executor = Arc::new(ScriptedExecutor::default());
        let mut runner = TestRunner::new(BASE_URL, Arc::clone(&executor)).unwrap();
        for name in ["c", "a", "b"] {
            runner
                .register(case(name, "/search", Expectation::success()))
                .unwrap();
        }

        let report = runner.run_all().await.unwrap();

        assert_eq!(executor.calls(), ["c", "a", "b"]);
        let names: Vec<_> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_malformed_expectation_is_isolated() {
        let executor = ScriptedExecutor::default()
            .respond("broken", 200, "")
            .respond("fine", 200, "");
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor)).unwrap();
        runner
            .register(case("broken", "/report", Expectation::status_in([])))
            .unwrap();
        runner
            .register(case("fine", "/report", Expectation::status(200)))
            .unwrap();

        let report = runner.run_all().await.unwrap();

        let broken = report.entry("broken").unwrap();
        assert!(!broken.passed);
        assert_eq!(
            broken.outcome.diagnostic.as_deref(),
            Some("expectation could not be evaluated: status set is empty")
        );
        assert!(report.entry("fine").unwrap().passed);
    }

    #[tokio::test]
    async fn test_panicking_executor_is_isolated() {
        let executor = ScriptedExecutor::default()
            .panic_on("boom")
            .respond("after", 200, "");
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor)).unwrap();
        runner
            .register(case("boom", "/report", Expectation::success()))
            .unwrap();
        runner
            .register(case("after", "/report", Expectation::success()))
            .unwrap();

        let report = runner.run_all().await.unwrap();

        let boom = report.entry("boom").unwrap();
        assert!(!boom.passed);
        assert!(matches!(
            boom.outcome.transport_error,
            Some(TransportError::Other { .. })
        ));
        assert!(report.entry("after").unwrap().passed);
    }

    #[tokio::test]
    async fn test_concurrent_run_keeps_registration_order() {
        let executor = ScriptedExecutor::default()
            .respond("slow", 200, "")
            .respond("medium", 200, "")
            .respond("fast", 500, "")
            .delay("slow", 60)
            .delay("medium", 30);
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor))
            .unwrap()
            .with_concurrency(3);
        runner
            .register(case("slow", "/search", Expectation::status(200)))
            .unwrap();
        runner
            .register(case("medium", "/search", Expectation::status(200)))
            .unwrap();
        runner
            .register(case("fast", "/search", Expectation::status(200)))
            .unwrap();

        let report = runner.run_all().await.unwrap();

        let summary: Vec<_> = report
            .entries()
            .iter()
            .map(|e| (e.name.as_str(), e.passed))
            .collect();
        assert_eq!(
            summary,
            [("slow", true), ("medium", true), ("fast", false)]
        );
    }

    #[tokio::test]
    async fn test_unbounded_concurrency_is_clamped() {
        let executor = ScriptedExecutor::default().respond("only", 200, "");
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor))
            .unwrap()
            .with_concurrency(usize::MAX);
        runner
            .register(case("only", "/search", Expectation::status(200)))
            .unwrap();

        let report = runner.run_all().await.unwrap();

        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn test_cancelled_run_stops_its_requests() {
        for concurrency in [1, 4] {
            let executor = ["a", "b", "c", "d"]
                .into_iter()
                .fold(ScriptedExecutor::default(), |executor, name| {
                    executor.respond(name, 200, "").delay(name, 50)
                });
            let executor = Arc::new(executor);
            let mut runner = TestRunner::new(BASE_URL, Arc::clone(&executor))
                .unwrap()
                .with_concurrency(concurrency);
            for name in ["a", "b", "c", "d"] {
                runner
                    .register(case(name, "/search", Expectation::status(200)))
                    .unwrap();
            }

            let cancelled =
                tokio::time::timeout(Duration::from_millis(10), runner.run_all()).await;
            assert!(cancelled.is_err());
            assert_eq!(runner.state(), RunnerState::Finalized);

            tokio::time::sleep(Duration::from_millis(100)).await;
            assert_eq!(executor.completed(), 0, "concurrency {concurrency}");
        }
    }

    #[tokio::test]
    async fn test_state_transitions_and_rerun() {
        let executor = ScriptedExecutor::default().respond("report_ok", 200, "");
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor)).unwrap();
        runner
            .register(case("report_ok", "/report", Expectation::status(200)))
            .unwrap();
        assert_eq!(runner.state(), RunnerState::NotStarted);

        let first = runner.run_all().await.unwrap();
        assert_eq!(runner.state(), RunnerState::Finalized);

        let second = runner.run_all().await.unwrap();
        assert_ne!(first.run_id(), second.run_id());
        assert_eq!(
            first.entries().iter().map(|e| e.passed).collect::<Vec<_>>(),
            second.entries().iter().map(|e| e.passed).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_run_is_not_reentrant() {
        let executor = ScriptedExecutor::default()
            .respond("slow", 200, "")
            .delay("slow", 20);
        let mut runner = TestRunner::new(BASE_URL, Arc::new(executor)).unwrap();
        runner
            .register(case("slow", "/report", Expectation::status(200)))
            .unwrap();

        let (first, second) = tokio::join!(runner.run_all(), runner.run_all());

        assert!(first.is_ok());
        assert_eq!(second, Err(ApplicationError::RunInProgress));
        assert_eq!(runner.state(), RunnerState::Finalized);
    }

    #[tokio::test]
    async fn test_suite_base_url_wins() {
        let suite = SuiteDefinition {
            name: "remote".to_string(),
            base_url: Some(BaseUrl::parse("https://lost-and-found.example.com").unwrap()),
            timeout_ms: None,
            cases: Vec::new(),
        };
        let runner =
            TestRunner::from_suite(suite, BASE_URL, Arc::new(ScriptedExecutor::default())).unwrap();

        assert_eq!(
            runner.base_url().as_str(),
            "https://lost-and-found.example.com"
        );
        assert!(runner.is_empty());
        assert_eq!(runner.run_all().await.unwrap().total(), 0);
    }
}
