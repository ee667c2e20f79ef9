// src/errors.rs

//! Crate-wide error type and result alias.

use std::fmt;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipejoinError {
    /// A stage's process could not be created.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A stage exited unsuccessfully.
    #[error("stage '{program}' {exit}")]
    Runtime { program: String, exit: ExitFailure },

    /// Pipe allocation or descriptor duplication failed.
    #[error("pipe error: {0}")]
    Pipe(#[source] std::io::Error),

    /// A stage was killed because a sibling failed under the fail-fast policy.
    #[error("stage '{program}' aborted after a sibling failed")]
    Aborted { program: String },

    #[error("wait called before start on '{unit}'")]
    NotStarted { unit: String },

    #[error("'{unit}' was already started")]
    AlreadyStarted { unit: String },

    #[error("'{unit}' was already waited on")]
    AlreadyWaited { unit: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Argument error: {0}")]
    ArgsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipejoinError {
    /// Build a `Runtime` error from a non-successful exit status.
    pub fn from_exit(program: impl Into<String>, status: ExitStatus) -> Self {
        PipejoinError::Runtime {
            program: program.into(),
            exit: ExitFailure::from(status),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, PipejoinError::Aborted { .. })
    }
}

/// How a stage failed: an exit code, a terminating signal, or neither if the
/// platform reported nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitFailure {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<ExitStatus> for ExitFailure {
    fn from(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        Self {
            code: status.code(),
            signal: status.signal(),
        }
    }
}

impl fmt::Display for ExitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exited with status {code}"),
            (None, Some(signal)) => write!(f, "terminated by signal {signal}"),
            (None, None) => write!(f, "exited unsuccessfully"),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipejoinError>;
