//! Error types for Hobbes
//!
//! Uses `thiserror` for library errors. Recoverable problems (diagnostics,
//! per-path commit failures) are values, not variants here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Hobbes operations
pub type HobbesResult<T> = Result<T, HobbesError>;

/// Main error type for Hobbes operations
#[derive(Error, Debug)]
pub enum HobbesError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// The compilation unit never produced a consistent snapshot
    #[error("build failed: {message}")]
    PassFailure { message: String },

    /// The build trigger invoked by the scheduler failed
    #[error("build trigger failed: {message}")]
    SchedulerFault { message: String },

    /// A one-shot result was completed more than once
    #[error("build result already completed; late completion from pass #{pass} rejected")]
    CompletionRejected { pass: u64 },

    /// The coordinator shut down before the pass resolved
    #[error("build aborted before a result was produced")]
    BuildAborted,

    /// File watcher could not be installed
    #[error("watch error on {path}: {message}")]
    Watch { path: PathBuf, message: String },
}

impl From<notify::Error> for HobbesError {
    fn from(err: notify::Error) -> Self {
        HobbesError::Watch {
            path: err.paths.first().cloned().unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_pass_failure() {
        let err = HobbesError::PassFailure {
            message: "tsconfig.json not found".to_string(),
        };
        assert_eq!(err.to_string(), "build failed: tsconfig.json not found");
    }

    #[test]
    fn test_error_display_completion_rejected() {
        let err = HobbesError::CompletionRejected { pass: 3 };
        assert_eq!(
            err.to_string(),
            "build result already completed; late completion from pass #3 rejected"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HobbesError = io_err.into();
        assert!(matches!(err, HobbesError::Io(_)));
    }
}
