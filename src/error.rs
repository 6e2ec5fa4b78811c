use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while expanding patterns or removing matches
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Invalid pattern '{pattern}': {message}")]
    PatternExpansion { pattern: String, message: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CleanError {
    pub(crate) fn pattern(pattern: &str, message: impl Into<String>) -> Self {
        CleanError::PatternExpansion {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for cleaner error handling
pub type Result<T> = std::result::Result<T, CleanError>;
