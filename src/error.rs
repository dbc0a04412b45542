//! Centralized error types for msgview.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from decoding a single structured-storage container.
///
/// A decode failure is fatal for that one message only; it never affects
/// the indexing or loading of sibling files.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The container's directory or sector structure is inconsistent.
    #[error("malformed structured-storage container: {reason}")]
    MalformedContainer { reason: String },

    /// The byte stream ended before an expected structure was read.
    #[error("truncated structured-storage container: {reason}")]
    Truncated { reason: String },
}

impl DecodeError {
    /// Map an I/O error from the underlying container reader.
    ///
    /// `UnexpectedEof` means the stream ran out mid-structure; everything
    /// else is reported as a malformed container.
    pub(crate) fn from_io(source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated {
                reason: source.to_string(),
            }
        } else {
            Self::MalformedContainer {
                reason: source.to_string(),
            }
        }
    }

    pub(crate) fn truncated(reason: impl Into<String>) -> Self {
        Self::Truncated {
            reason: reason.into(),
        }
    }
}

/// Errors from loading a message file into a [`crate::model::Message`].
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not resolve to a readable file.
    #[error("message file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file opened but its container failed to decode.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

impl LoadError {
    /// Create an `Io` variant from a path and an `io::Error`,
    /// mapping `NotFound` to its dedicated variant.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Convenience alias for `Result<T, LoadError>`.
pub type Result<T> = std::result::Result<T, LoadError>;
