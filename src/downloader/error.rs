use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Status,
    InvalidUrl,
    MissingFilename,
    Filesystem,
}

/// Why a single fetch failed. The `Display` text is the reason shown after
/// `Error downloading <url>: `.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{reason}")]
    Network { url: String, reason: String },

    #[error("HTTP status {code}")]
    Status { url: String, code: u16 },

    #[error("invalid url: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no filename after the last '/' in the url")]
    MissingFilename { url: String },

    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DownloadError::Network { .. } => ErrorKind::Network,
            DownloadError::Status { .. } => ErrorKind::Status,
            DownloadError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            DownloadError::MissingFilename { .. } => ErrorKind::MissingFilename,
            DownloadError::Filesystem { .. } => ErrorKind::Filesystem,
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DownloadError::Filesystem {
            path: path.into(),
            source,
        }
    }
}
