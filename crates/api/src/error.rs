//! Error types for the relay client.

use peerpass_protocol::{FailureKind, InviteCodeError};
use peerpass_transfer::Retryable;

/// A header whose value could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {header} header: {value:?}")]
pub struct HeaderError {
    /// Header name, lowercase.
    pub header: &'static str,
    /// The offending value as received.
    pub value: String,
}

/// Errors from the size probe. None of them are retried; without a size
/// there is nothing to plan.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("probe request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("probe answered with status {0}")]
    UnexpectedStatus(u16),

    #[error("probe response carried no size-bearing header")]
    SizeMissing,

    #[error(transparent)]
    Malformed(#[from] HeaderError),

    #[error("resource reports a size of zero")]
    EmptySize,
}

impl ProbeError {
    /// User-visible failure category for this error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ProbeError::UnexpectedStatus(_) => FailureKind::ServerIncompatible,
            _ => FailureKind::SizeUnknown,
        }
    }
}

/// Errors from fetching a single chunk.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network-layer failure. Worth another attempt.
    #[error("chunk request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A status outside the range contract. Worth another attempt.
    #[error("chunk request answered with status {0}")]
    UnexpectedStatus(u16),

    /// The server answered with a different byte extent than requested.
    /// Never retried; the server cannot be trusted with ranges.
    #[error("requested {requested}, server answered {got}")]
    RangeMismatch { requested: String, got: String },
}

impl Retryable for FetchError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::UnexpectedStatus(_)
        )
    }
}

impl FetchError {
    /// User-visible failure category, assuming retries are already spent.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            FetchError::Transport(_) | FetchError::UnexpectedStatus(_) => {
                FailureKind::NetworkExhausted
            }
            FetchError::RangeMismatch { .. } => FailureKind::ServerIncompatible,
        }
    }
}

/// Errors from the upload request.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upload answered with status {0}")]
    UnexpectedStatus(u16),

    #[error("upload response was not understood: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relay handed back an invalid invite code: {0}")]
    InvalidCode(#[from] InviteCodeError),
}

impl UploadError {
    /// User-visible failure category for this error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            UploadError::Io(_) => FailureKind::Internal,
            UploadError::Transport(_) | UploadError::UnexpectedStatus(_) => {
                FailureKind::NetworkExhausted
            }
            UploadError::Json(_) | UploadError::InvalidCode(_) => {
                FailureKind::ServerIncompatible
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
