mod case;
mod runner;
mod source;

pub use case::{Expectation, ExpectedOutcome, SuiteCase, SuiteRun, SUITE_SCHEMA_V1};
pub use runner::{assert_suite, check_expectation, run_suite, SuiteReport};
pub use source::{read_scripts_from_dir, read_suite_case, SCRIPT_EXTENSION};

use std::path::PathBuf;

use straw_core::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrawToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse suite {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid suite schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("No .rhai files under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("Scene error: {0}")]
    Scene(#[from] straw_host::SceneError),
    #[error("Script \"{script}\" is not present in the suite directory.")]
    ScriptNotFound { script: String },
    #[error("Script \"{script}\" passed but was expected to fail.")]
    UnexpectedPass { script: String },
    #[error("Script \"{script}\" failed unexpectedly: {message}")]
    UnexpectedFailure { script: String, message: String },
    #[error("Script \"{script}\" failed with kind {actual}, expected {expected}.")]
    FailureKindMismatch {
        script: String,
        expected: FailureKind,
        actual: FailureKind,
    },
    #[error("Script \"{script}\" failed with message {actual:?}, expected {expected:?}.")]
    FailureMessageMismatch {
        script: String,
        expected: String,
        actual: String,
    },
}
