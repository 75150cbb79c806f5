//! Error types for the coreference pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a document or a batch
#[derive(Error, Debug)]
pub enum Error {
    /// The linguistic annotation service failed or rejected its input
    #[error("Annotation service error: {0}")]
    Annotation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error tied to the file that caused it
    #[error("I/O error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch worker task failed to complete
    #[error("Batch error: {0}")]
    Batch(String),
}

impl Error {
    /// Wrap an I/O error with the path it came from
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::File {
            path: path.into(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Batch(err.to_string())
    }
}
