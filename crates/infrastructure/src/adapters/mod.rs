//! Infrastructure adapters

mod reqwest_executor;

pub use reqwest_executor::{ExecutorBuildError, ReqwestExecutor};
