//! Session error taxonomies.

use peerpass_api::{FetchError, ProbeError};
use peerpass_protocol::FailureKind;
use peerpass_transfer::IncompleteTransfer;

/// Ways a download session ends other than completing.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The probe could not establish size and name. Nothing was fetched.
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// A chunk ran out of attempts or hit a range-contract violation.
    #[error("chunk {sequence_index} failed: {source}")]
    Fetch {
        sequence_index: usize,
        source: FetchError,
    },

    /// Assembly found a hole the fetch loop should have made impossible.
    #[error(transparent)]
    Incomplete(#[from] IncompleteTransfer),

    /// The session was cancelled before it finished.
    #[error("transfer cancelled")]
    Cancelled,

    /// The session task died without reporting back.
    #[error("session task failed: {0}")]
    Internal(String),
}

impl DownloadError {
    /// User-visible failure category; `None` for cancellation, which is a
    /// terminal state of its own rather than a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DownloadError::Probe(err) => Some(err.failure_kind()),
            DownloadError::Fetch { source, .. } => Some(source.failure_kind()),
            DownloadError::Incomplete(_) => Some(FailureKind::Internal),
            DownloadError::Internal(_) => Some(FailureKind::Internal),
            DownloadError::Cancelled => None,
        }
    }
}

/// Ways an upload session ends other than completing.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Api(#[from] peerpass_api::UploadError),

    /// The session was cancelled before the relay answered.
    #[error("transfer cancelled")]
    Cancelled,

    /// The session task died without reporting back.
    #[error("session task failed: {0}")]
    Internal(String),
}

impl UploadError {
    /// User-visible failure category; `None` for cancellation.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            UploadError::Api(err) => Some(err.failure_kind()),
            UploadError::Internal(_) => Some(FailureKind::Internal),
            UploadError::Cancelled => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
