//! Error types for sift.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Manifest errors
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Dependency edge for {path} references unknown target: {target}")]
    UnknownTarget { path: String, target: String },

    #[error("Duplicate target: {0}")]
    DuplicateTarget(String),

    #[error("Duplicate environment: {0}")]
    DuplicateEnvironment(String),

    // Scheduling errors
    #[error("No compatible environment for target {target} ({requirement})")]
    NoCompatibleEnvironment { target: String, requirement: String },

    #[error("Timed out waiting for a free environment for target: {0}")]
    EnvironmentTimeout(String),

    // Execution errors
    #[error("Execution timed out after {seconds}s: {target}")]
    ExecutionTimeout { target: String, seconds: u64 },

    #[error("Process failed with exit code {exit_code}: {target}")]
    ProcessFailure { target: String, exit_code: i32 },

    #[error("Failed to spawn test process: {0}")]
    ProcessSpawn(String),

    // Run errors
    #[error("Run aborted by skip directive")]
    AbortedByDirective,

    #[error("Run aborted: {reason}")]
    RunAborted { reason: String },

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
