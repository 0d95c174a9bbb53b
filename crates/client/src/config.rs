//! Transfer tuning knobs.

use peerpass_transfer::{DEFAULT_CHUNK_SIZE, RateMode, RetryPolicy};

/// Configuration shared by every session a [`TransferClient`] starts.
///
/// The defaults reproduce the web front end's behavior: 5 MiB chunks,
/// five attempts per chunk with a 500 ms linear backoff, and the
/// whole-session average rate.
///
/// [`TransferClient`]: crate::TransferClient
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Planned size of each chunk in bytes.
    pub chunk_size: u64,
    /// Retry bounds for individual chunk fetches.
    pub retry: RetryPolicy,
    /// Throughput estimation mode for progress snapshots.
    pub rate_mode: RateMode,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
            rate_mode: RateMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
