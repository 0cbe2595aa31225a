use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Classified failure returned by every core operation.
///
/// Nothing here is fatal: each call is independent and the caller decides
/// whether to surface the error or log it.
#[derive(Debug, Error)]
pub enum FmError {
    #[error("control channel unavailable: {}", address.display())]
    ChannelUnavailable {
        address: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("permission denied: {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no such file or directory: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("not a valid directory: {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error("i/o failure on {}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{field} contains reserved character {ch:?}")]
    ReservedCharacter { field: &'static str, ch: char },
}

pub type Result<T> = std::result::Result<T, FmError>;

impl FmError {
    /// Classify an error from an ordinary (non-channel) path.
    ///
    /// A path that runs through a regular file (`ENOTDIR`) does not exist, so
    /// it is reported as not found.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => FmError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => FmError::PermissionDenied {
                path: path.to_path_buf(),
                source: err,
            },
            _ => FmError::IoFailure {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    pub fn io_failure(path: &Path, err: io::Error) -> Self {
        FmError::IoFailure {
            path: path.to_path_buf(),
            source: err,
        }
    }

    /// Short machine-friendly name of the variant, used in logs and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            FmError::ChannelUnavailable { .. } => "channel-unavailable",
            FmError::PermissionDenied { .. } => "permission-denied",
            FmError::NotFound { .. } => "not-found",
            FmError::NotADirectory { .. } => "not-a-directory",
            FmError::IoFailure { .. } => "io-failure",
            FmError::ReservedCharacter { .. } => "reserved-character",
        }
    }
}
