//! In-order reassembly of fetched chunks.

use std::collections::BTreeMap;

use crate::ChunkResult;

/// Error returned by [`Assembler::finalize`] when a chunk never arrived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transfer incomplete: chunk {missing_index} of {expected_chunks} never arrived")]
pub struct IncompleteTransfer {
    /// Lowest sequence index with no payload.
    pub missing_index: usize,
    /// Number of chunks the plan called for.
    pub expected_chunks: usize,
}

/// Collects chunk payloads and concatenates them in sequence order.
///
/// Chunks may be appended in any order; `finalize` refuses to produce an
/// artifact until every index in `0..expected_chunks` has a payload, so a
/// partial transfer can never be mistaken for a finished one.
#[derive(Debug)]
pub struct Assembler {
    expected_chunks: usize,
    chunks: BTreeMap<usize, Vec<u8>>,
}

impl Assembler {
    /// Creates an assembler expecting `expected_chunks` payloads.
    pub fn new(expected_chunks: usize) -> Self {
        Self {
            expected_chunks,
            chunks: BTreeMap::new(),
        }
    }

    /// Stores one fetched chunk. A repeated index replaces the earlier
    /// payload.
    pub fn append(&mut self, result: ChunkResult) {
        self.chunks.insert(result.sequence_index, result.payload);
    }

    /// Number of chunks stored so far.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total bytes buffered so far.
    pub fn bytes_buffered(&self) -> u64 {
        self.chunks.values().map(|c| c.len() as u64).sum()
    }

    /// True once every expected index has a payload.
    pub fn is_complete(&self) -> bool {
        (0..self.expected_chunks).all(|i| self.chunks.contains_key(&i))
    }

    /// Concatenates all chunks in ascending sequence order.
    pub fn finalize(self) -> Result<Vec<u8>, IncompleteTransfer> {
        for index in 0..self.expected_chunks {
            if !self.chunks.contains_key(&index) {
                return Err(IncompleteTransfer {
                    missing_index: index,
                    expected_chunks: self.expected_chunks,
                });
            }
        }

        let total: usize = self.chunks.values().map(Vec::len).sum();
        let mut artifact = Vec::with_capacity(total);
        for (_, chunk) in self.chunks {
            artifact.extend_from_slice(&chunk);
        }
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
