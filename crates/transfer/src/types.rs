use chrono::{DateTime, Utc};

/// One planned byte range of a resource.
///
/// Offsets are inclusive on both ends, matching the HTTP `Range` header
/// convention. Ranges produced by [`plan`](crate::plan) are contiguous and
/// gapless in `sequence_index` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Position of this range in the plan, starting at zero.
    pub sequence_index: usize,
    /// First byte offset covered.
    pub start: u64,
    /// Last byte offset covered, inclusive.
    pub end: u64,
}

impl ChunkRange {
    /// Number of bytes the range covers.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// True when the range covers no bytes. Planned ranges never are.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Value for an HTTP `Range` header requesting exactly this range.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// The payload fetched for one planned range.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    /// Plan position this payload belongs to.
    pub sequence_index: usize,
    /// The fetched bytes.
    pub payload: Vec<u8>,
    /// When the fetch finished.
    pub received_at: DateTime<Utc>,
}

impl ChunkResult {
    /// Wraps a fetched payload, stamped with the current time.
    pub fn new(sequence_index: usize, payload: Vec<u8>) -> Self {
        Self {
            sequence_index,
            payload,
            received_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
