use serde::{Deserialize, Serialize};

/// Which way bytes move in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "upload")]
    Upload,
    #[serde(rename = "download")]
    Download,
}

/// Lifecycle state of a transfer session.
///
/// Downloads walk `Idle → Probing → Planning → Fetching → Assembling →
/// Complete`, bouncing between `Fetching` and `Retrying` while a chunk is
/// being re-attempted. Uploads skip straight from `Idle` to `Fetching`.
/// `Complete`, `Failed` and `Cancelled` are terminal; a session never
/// leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferState {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "probing")]
    Probing,
    #[serde(rename = "planning")]
    Planning,
    #[serde(rename = "fetching")]
    Fetching,
    #[serde(rename = "retrying")]
    Retrying,
    #[serde(rename = "assembling")]
    Assembling,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl TransferState {
    /// Returns true once the session can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferState::Complete | TransferState::Failed | TransferState::Cancelled
        )
    }

    /// Returns true while the session is doing work (anything past `Idle`
    /// that is not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal() && *self != TransferState::Idle
    }
}

/// Why a session ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The probe could not establish the resource's total size.
    #[serde(rename = "size_unknown")]
    SizeUnknown,
    /// The server broke the range contract mid-transfer.
    #[serde(rename = "server_incompatible")]
    ServerIncompatible,
    /// A chunk ran out of fetch attempts.
    #[serde(rename = "network_exhausted")]
    NetworkExhausted,
    /// A bug on our side; the transfer state stopped making sense.
    #[serde(rename = "internal")]
    Internal,
}

impl FailureKind {
    /// Short human-readable cause, suitable for an alert line.
    pub fn describe(&self) -> &'static str {
        match self {
            FailureKind::SizeUnknown => "unable to determine file size",
            FailureKind::ServerIncompatible => "server does not support resumable downloads",
            FailureKind::NetworkExhausted => "network kept failing; gave up after retries",
            FailureKind::Internal => "internal transfer error",
        }
    }
}

/// Point-in-time view of a session, safe to request at any moment.
///
/// `percent` is always in `0.0..=100.0`. The rate and ETA fields are `None`
/// until enough has happened to compute them; they are never `NaN` or
/// infinite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSnapshot {
    pub state: TransferState,
    pub direction: Direction,
    pub percent: f64,
    pub bytes_transferred: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_bytes_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
