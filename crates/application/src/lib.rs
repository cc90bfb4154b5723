//! Probe Application - Test runner and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - The test runner that owns the registry and builds reports
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod runner;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::RequestExecutor;
pub use runner::{RunnerState, TestRunner};
