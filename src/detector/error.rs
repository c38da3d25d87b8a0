use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by detector implementations.
///
/// The fusion engine treats every variant as non-fatal: it continues with an empty
/// [`DetectorOutput`](super::DetectorOutput).
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Frame could not be read from disk.
    #[error("unreadable frame {path}: {source}")]
    UnreadableFrame {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Frame was read but is empty or in an unsupported format.
    #[error("unsupported frame {path}: {reason}")]
    UnsupportedFrame { path: PathBuf, reason: String },

    /// Transport failure talking to the detector service.
    #[error("detector request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Detector service answered with a non-success status.
    #[error("detector returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Detector response could not be decoded.
    #[error("failed to decode detector response: {reason}")]
    Decode { reason: String },
}

/// Convenience result type for detector operations.
pub type DetectorResult<T> = Result<T, DetectorError>;
