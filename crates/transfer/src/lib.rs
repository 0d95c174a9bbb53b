//! Core transfer logic for the PeerPass client.
//!
//! Everything here is coordination state with no network or disk I/O: how a
//! resource is split into ranges, how fetched pieces are put back together,
//! how failures are retried, and how progress is measured. The HTTP edge
//! lives in `peerpass-api`; orchestration lives in `peerpass-client`.

mod assembler;
mod planner;
mod progress;
mod retry;
mod session;
mod types;

pub use assembler::{Assembler, IncompleteTransfer};
pub use planner::plan;
pub use progress::{ProgressEstimator, RateMode};
pub use retry::{RetryPolicy, Retryable};
pub use session::TransferSession;
pub use types::{ChunkRange, ChunkResult};

use std::time::Duration;

/// Default chunk size: 5 MiB. Every planned range but the last covers
/// exactly this many bytes.
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Default cap on fetch attempts for a single chunk, counting the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff unit; the wait after the n-th failure is n times this.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Window the windowed rate mode averages over.
pub const RATE_WINDOW: Duration = Duration::from_secs(5);

/// Cap on retained progress samples.
pub const MAX_PROGRESS_SAMPLES: usize = 100;
