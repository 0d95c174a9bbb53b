//! Chunk range planning.

use crate::ChunkRange;

/// Partitions `total_bytes` into fixed-size inclusive ranges.
///
/// Produces `ceil(total_bytes / chunk_size)` contiguous ranges in ascending
/// order; the final range is shorter when the total is not an exact
/// multiple. A zero-byte resource yields an empty plan, which callers treat
/// as an already-complete transfer.
pub fn plan(total_bytes: u64, chunk_size: u64) -> Vec<ChunkRange> {
    debug_assert!(chunk_size > 0, "chunk size must be positive");
    if total_bytes == 0 || chunk_size == 0 {
        return Vec::new();
    }

    let count = total_bytes.div_ceil(chunk_size) as usize;
    let mut ranges = Vec::with_capacity(count);
    let mut start = 0u64;
    let mut sequence_index = 0usize;
    while start < total_bytes {
        let end = (start + chunk_size - 1).min(total_bytes - 1);
        ranges.push(ChunkRange {
            sequence_index,
            start,
            end,
        });
        start = end + 1;
        sequence_index += 1;
    }
    ranges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
