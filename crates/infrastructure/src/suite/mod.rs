//! Suite files (JSON or YAML).

mod loader;

pub use loader::{
    SuiteFormat, SuiteLoadError, load_suite, parse_suite, render_suite, save_suite,
};
