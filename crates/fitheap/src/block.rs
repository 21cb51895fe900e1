//! Read-only traversal of the block list.

use crate::header::{BlockHeader, HEADER_SIZE};
use crate::heap::Heap;
use crate::ptr::HeapPtr;

/// Snapshot of one block, as seen while walking the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Arena offset of the block header.
    pub offset: usize,
    /// Payload bytes.
    pub size: usize,
    /// Whether the block is available for allocation.
    pub is_free: bool,
}

impl BlockInfo {
    /// Reference to this block's payload.
    pub fn payload(&self) -> HeapPtr {
        HeapPtr::from_header(self.offset)
    }

    /// Offset one past the last payload byte.
    pub fn end(&self) -> usize {
        self.offset + HEADER_SIZE + self.size
    }
}

/// Address-order iterator over a heap's blocks.
///
/// Created by [`Heap::blocks`]. Yields nothing before the first allocation.
pub struct Blocks<'a> {
    heap: &'a Heap,
    cursor: Option<usize>,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let at = self.cursor?;
        let BlockHeader {
            size,
            is_free,
            next,
        } = self.heap.header(at);
        self.cursor = next;
        Some(BlockInfo {
            offset: at,
            size,
            is_free,
        })
    }
}

impl Heap {
    /// Walk every block in address order.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            heap: self,
            cursor: self.head(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_heap_has_no_blocks() {
        let heap = Heap::with_capacity(256).unwrap();
        assert!(heap.blocks().next().is_none());
    }

    #[test]
    fn blocks_are_yielded_in_address_order() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(10).unwrap();
        heap.allocate(20).unwrap();
        let offsets: Vec<_> = heap.blocks().map(|b| b.offset).collect();
        assert_eq!(offsets, vec![0, HEADER_SIZE + 10, 2 * HEADER_SIZE + 30]);
    }

    #[test]
    fn block_payload_matches_allocation() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        let ptr = heap.allocate(10).unwrap();
        let first = heap.blocks().next().unwrap();
        assert_eq!(first.payload(), ptr);
        assert!(!first.is_free);
    }

    #[test]
    fn last_block_ends_at_capacity() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(100).unwrap();
        let last = heap.blocks().last().unwrap();
        assert_eq!(last.end(), 1024);
        assert!(last.is_free);
    }
}
