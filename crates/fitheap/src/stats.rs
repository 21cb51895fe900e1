//! Occupancy statistics.
//!
//! [`HeapStats`] is a point-in-time summary of the block list, gathered in
//! a single walk. Useful for telemetry and for spotting fragmentation: a
//! large `bytes_free` with a small `largest_free` means the free space is
//! scattered across many holes.

use crate::heap::Heap;

/// Occupancy summary produced by [`Heap::stats`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Arena size in bytes, headers included.
    pub capacity: usize,
    /// Payload bytes in allocated blocks.
    pub bytes_in_use: usize,
    /// Payload bytes in free blocks.
    pub bytes_free: usize,
    /// Number of blocks in the list.
    pub block_count: usize,
    /// Number of free blocks.
    pub free_block_count: usize,
    /// Payload bytes of the largest free block.
    pub largest_free: usize,
    /// Cumulative bytes requested, including failed requests.
    pub total_requested: u64,
}

impl HeapStats {
    /// Bytes taken up by block headers.
    pub fn header_bytes(&self) -> usize {
        self.capacity
            .saturating_sub(self.bytes_in_use + self.bytes_free)
    }
}

impl Heap {
    /// Summarize the current block list.
    ///
    /// Before the first allocation every count is zero except `capacity`.
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            capacity: self.capacity(),
            total_requested: self.total_requested(),
            ..HeapStats::default()
        };
        for block in self.blocks() {
            stats.block_count += 1;
            if block.is_free {
                stats.free_block_count += 1;
                stats.bytes_free += block.size;
                stats.largest_free = stats.largest_free.max(block.size);
            } else {
                stats.bytes_in_use += block.size;
            }
        }
        stats
    }
}
