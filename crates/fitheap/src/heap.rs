//! The first-fit heap.
//!
//! A [`Heap`] owns one fixed-capacity byte arena. The arena is partitioned
//! by an intrusive, address-ordered list of blocks: each block is a
//! [`HEADER_SIZE`]-byte header followed by its payload, and each header
//! links to the block that starts right after its payload.
//!
//! Allocation scans the list from the first block and takes the first free
//! block that either fits exactly or can be split into a used prefix plus a
//! free remainder with room for its own header. Releasing a block marks it
//! free and then coalesces neighbouring free blocks, so no two adjacent
//! blocks are ever both free once an operation returns.

use tracing::{debug, trace};

use crate::config::HeapConfig;
use crate::error::{ConfigError, HeapError};
use crate::header::{BlockHeader, HEADER_SIZE};
use crate::ptr::HeapPtr;

/// A manual allocator over a single fixed-capacity byte arena.
///
/// The arena is allocated once by the constructor and is never resized or
/// moved. Its block list is created lazily by the first
/// [`allocate`](Heap::allocate) call, which lays out one free block
/// spanning the whole arena.
///
/// All mutating operations take `&mut self`; callers that share a heap
/// across threads must wrap it in their own lock.
pub struct Heap {
    /// Backing storage. Block headers live inside it.
    arena: Box<[u8]>,
    /// Offset of the first block header, `None` until the first allocation.
    head: Option<usize>,
    /// Cumulative bytes requested through `allocate`, successful or not.
    total_requested: u64,
}

impl Heap {
    /// Create a heap with the given configuration.
    ///
    /// Returns `Err` if the capacity cannot hold a single block or does not
    /// fit the header encoding.
    pub fn new(config: HeapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(&config))
    }

    /// Create a heap whose arena is `capacity` bytes, headers included.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::new(HeapConfig::new(capacity))
    }

    fn from_valid(config: &HeapConfig) -> Self {
        Self {
            arena: vec![0u8; config.capacity].into_boxed_slice(),
            head: None,
            total_requested: 0,
        }
    }

    /// Arena size in bytes, headers included.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Whether the block list has been laid out yet.
    pub fn is_initialized(&self) -> bool {
        self.head.is_some()
    }

    /// Cumulative number of bytes requested through [`allocate`](Heap::allocate)
    /// (including the allocation step of [`resize`](Heap::resize)), counting
    /// failed requests too.
    pub fn total_requested(&self) -> u64 {
        self.total_requested
    }

    /// Allocate `size` payload bytes using a first-fit scan.
    ///
    /// A zero-byte request is served as a one-byte allocation so that every
    /// returned reference is distinct. The payload keeps whatever bytes were
    /// previously stored there; it is not zeroed.
    ///
    /// Returns [`HeapError::OutOfMemory`] if no free block can hold the
    /// request. The arena never grows.
    pub fn allocate(&mut self, size: usize) -> Result<HeapPtr, HeapError> {
        self.total_requested = self.total_requested.saturating_add(size as u64);
        let size = size.max(1);

        let mut cursor = Some(self.head_or_init());
        while let Some(at) = cursor {
            let mut header = self.header(at);
            if header.is_free {
                if header.size == size {
                    header.is_free = false;
                    self.write_header(at, &header);
                    trace!(offset = at + HEADER_SIZE, size, "allocated exact fit");
                    return Ok(HeapPtr::from_header(at));
                }
                // The remainder needs its own header plus at least one byte.
                if header.size > size.saturating_add(HEADER_SIZE) {
                    self.split(at, size);
                    trace!(offset = at + HEADER_SIZE, size, "allocated from split");
                    return Ok(HeapPtr::from_header(at));
                }
            }
            cursor = header.next;
        }

        let largest_free = self.largest_free();
        debug!(requested = size, largest_free, "allocation failed");
        Err(HeapError::OutOfMemory {
            requested: size,
            largest_free,
        })
    }

    /// Carve a used prefix of `size` bytes out of the free block at `at`.
    ///
    /// The caller guarantees `size + HEADER_SIZE < block.size`.
    fn split(&mut self, at: usize, size: usize) {
        let block = self.header(at);
        debug_assert!(block.is_free && block.size > size + HEADER_SIZE);

        let remainder_at = at + HEADER_SIZE + size;
        let remainder = BlockHeader::free(block.size - size - HEADER_SIZE, block.next);
        self.write_header(remainder_at, &remainder);
        self.write_header(
            at,
            &BlockHeader {
                size,
                is_free: false,
                next: Some(remainder_at),
            },
        );
    }

    /// Return an allocation to the heap and merge adjacent free blocks.
    ///
    /// Returns [`HeapError::InvalidPointer`] if `ptr` is outside the arena
    /// or is not the payload of a live allocation (including a second
    /// release of the same pointer). The heap is left untouched in that case.
    pub fn release(&mut self, ptr: HeapPtr) -> Result<(), HeapError> {
        let (at, mut header) = self.live_block(ptr)?;
        header.is_free = true;
        self.write_header(at, &header);
        let merges = self.coalesce();
        trace!(offset = ptr.offset(), size = header.size, merges, "released");
        Ok(())
    }

    /// Merge every run of adjacent free blocks into a single block.
    ///
    /// A merged block is re-examined before the walk moves on, so runs of
    /// any length collapse in one pass. Returns the number of merges.
    fn coalesce(&mut self) -> usize {
        let mut merges = 0;
        let mut cursor = self.head;
        while let Some(at) = cursor {
            let mut header = self.header(at);
            let Some(next_at) = header.next else {
                break;
            };
            let next = self.header(next_at);
            if header.is_free && next.is_free {
                header.size += HEADER_SIZE + next.size;
                header.next = next.next;
                self.write_header(at, &header);
                merges += 1;
                continue;
            }
            cursor = header.next;
        }
        merges
    }

    /// Move an allocation into a block of `new_size` bytes.
    ///
    /// Allocates the new block first, copies `min(old_size, new_size)` bytes,
    /// then releases the old block. The returned reference generally differs
    /// from `ptr`.
    ///
    /// On [`HeapError::OutOfMemory`] the original allocation is left intact
    /// and still owned by the caller. Returns [`HeapError::InvalidPointer`]
    /// if `ptr` is not a live allocation.
    pub fn resize(&mut self, ptr: HeapPtr, new_size: usize) -> Result<HeapPtr, HeapError> {
        let (_, old) = self.live_block(ptr)?;
        let new_ptr = self.allocate(new_size)?;

        let len = old.size.min(new_size);
        let src = ptr.offset();
        self.arena.copy_within(src..src + len, new_ptr.offset());
        self.release(ptr)?;

        trace!(
            from = ptr.offset(),
            to = new_ptr.offset(),
            old_size = old.size,
            new_size,
            "resized"
        );
        Ok(new_ptr)
    }

    /// Payload size of a live allocation.
    pub fn size_of(&self, ptr: HeapPtr) -> Result<usize, HeapError> {
        self.live_block(ptr).map(|(_, header)| header.size)
    }

    /// Whether `ptr` falls inside the arena.
    ///
    /// This is range arithmetic only: the upper bound is exclusive and the
    /// offset is not checked against block boundaries.
    pub fn owns(&self, ptr: HeapPtr) -> bool {
        ptr.offset() < self.capacity()
    }

    /// Whether a raw machine address falls inside the arena buffer.
    pub fn owns_addr(&self, addr: *const u8) -> bool {
        self.arena.as_ptr_range().contains(&addr)
    }

    /// Sum of payload sizes over all allocated blocks.
    ///
    /// Returns 0 before the first allocation.
    pub fn bytes_in_use(&self) -> usize {
        self.blocks()
            .filter(|block| !block.is_free)
            .map(|block| block.size)
            .sum()
    }

    /// Borrow the payload bytes of a live allocation.
    pub fn payload(&self, ptr: HeapPtr) -> Result<&[u8], HeapError> {
        let (_, header) = self.live_block(ptr)?;
        let start = ptr.offset();
        Ok(&self.arena[start..start + header.size])
    }

    /// Mutably borrow the payload bytes of a live allocation.
    pub fn payload_mut(&mut self, ptr: HeapPtr) -> Result<&mut [u8], HeapError> {
        let (_, header) = self.live_block(ptr)?;
        let start = ptr.offset();
        Ok(&mut self.arena[start..start + header.size])
    }

    /// Copy the first `len` payload bytes of `src` into the payload of `dst`.
    ///
    /// `src` and `dst` may be the same allocation. Returns
    /// [`HeapError::RangeExceeded`] if either payload is shorter than `len`.
    pub fn copy(&mut self, src: HeapPtr, dst: HeapPtr, len: usize) -> Result<(), HeapError> {
        let (_, src_header) = self.live_block(src)?;
        let (_, dst_header) = self.live_block(dst)?;
        for (ptr, header) in [(src, src_header), (dst, dst_header)] {
            if len > header.size {
                return Err(HeapError::RangeExceeded {
                    offset: ptr.offset(),
                    len,
                    size: header.size,
                });
            }
        }
        let start = src.offset();
        self.arena.copy_within(start..start + len, dst.offset());
        Ok(())
    }

    /// Forget every allocation and return to the uninitialized state.
    ///
    /// All outstanding references become invalid. The arena bytes are not
    /// zeroed; the request counter restarts at 0.
    pub fn reset(&mut self) {
        debug!(
            capacity = self.capacity(),
            bytes_in_use = self.bytes_in_use(),
            "heap reset"
        );
        self.head = None;
        self.total_requested = 0;
    }

    /// Offset of the first block header, if the list has been laid out.
    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    /// Decode the header stored at arena offset `at`.
    pub(crate) fn header(&self, at: usize) -> BlockHeader {
        BlockHeader::read(&self.arena[at..at + HEADER_SIZE])
    }

    /// Encode `header` into the arena at offset `at`.
    pub(crate) fn write_header(&mut self, at: usize, header: &BlockHeader) {
        header.write(&mut self.arena[at..at + HEADER_SIZE]);
    }

    fn head_or_init(&mut self) -> usize {
        if let Some(head) = self.head {
            return head;
        }
        let initial = BlockHeader::free(self.capacity() - HEADER_SIZE, None);
        self.write_header(0, &initial);
        self.head = Some(0);
        debug!(
            capacity = self.capacity(),
            payload = initial.size,
            "heap initialised"
        );
        0
    }

    /// Locate the allocated block whose payload starts at `ptr`.
    fn live_block(&self, ptr: HeapPtr) -> Result<(usize, BlockHeader), HeapError> {
        if self.owns(ptr) {
            if let Some(target) = ptr.header_offset() {
                let mut cursor = self.head;
                while let Some(at) = cursor {
                    if at > target {
                        break;
                    }
                    let header = self.header(at);
                    if at == target && !header.is_free {
                        return Ok((at, header));
                    }
                    cursor = header.next;
                }
            }
        }
        debug!(offset = ptr.offset(), "rejected pointer");
        Err(HeapError::InvalidPointer {
            offset: ptr.offset(),
        })
    }

    fn largest_free(&self) -> usize {
        self.blocks()
            .filter(|block| block.is_free)
            .map(|block| block.size)
            .max()
            .unwrap_or(0)
    }
}

impl Default for Heap {
    /// A heap with [`HeapConfig::DEFAULT_CAPACITY`] bytes.
    fn default() -> Self {
        Self::from_valid(&HeapConfig::default())
    }
}
