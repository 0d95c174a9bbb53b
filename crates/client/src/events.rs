//! Push events for UI subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use peerpass_protocol::{FailureKind, TransferState};

/// Events emitted while a session runs.
///
/// Delivery is best-effort over a bounded channel: when a subscriber falls
/// behind, events are dropped rather than stalling the transfer. Snapshots
/// are the authoritative view; events are decoration on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TransferEvent {
    /// The session moved to a new lifecycle state.
    StateChanged { state: TransferState },
    /// The probe resolved the resource's size and name.
    Probed { total_bytes: u64, filename: String },
    /// One chunk arrived and went to the assembler.
    ChunkCompleted { sequence_index: usize, bytes: u64 },
    /// A chunk fetch failed transiently; another attempt is scheduled.
    ChunkRetrying {
        sequence_index: usize,
        attempt: u32,
        delay_ms: u64,
    },
    /// The transfer finished and the artifact is ready.
    Completed { total_bytes: u64 },
    /// The transfer ended in failure.
    Failed { kind: FailureKind },
}

/// Sends `event` without ever blocking the transfer.
pub(crate) fn emit(events: &mpsc::Sender<TransferEvent>, event: TransferEvent) {
    let _ = events.try_send(event);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
