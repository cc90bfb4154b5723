//! Application error types

use probe_domain::DomainError;
use thiserror::Error;

/// Application-level errors.
///
/// Only configuration and registration problems surface here. Anything
/// that goes wrong while a single test case runs is recorded in its
/// report entry instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The runner's base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A test case with this name is already registered.
    #[error("duplicate test case name: {0}")]
    DuplicateTestCase(String),

    /// `run_all` was called while a run was already in flight.
    #[error("a run is already in progress on this runner")]
    RunInProgress,
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
