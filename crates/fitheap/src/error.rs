//! Heap-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during heap operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// No free block is large enough to satisfy the request.
    OutOfMemory {
        /// Number of payload bytes requested.
        requested: usize,
        /// Largest free payload currently available (0 if none).
        largest_free: usize,
    },
    /// The reference does not name a live allocation of this heap.
    InvalidPointer {
        /// The arena-relative offset that was rejected.
        offset: usize,
    },
    /// A payload range operation reached past the end of a payload.
    RangeExceeded {
        /// Payload offset of the allocation that was too small.
        offset: usize,
        /// Number of bytes the operation needed.
        len: usize,
        /// Actual payload size of the allocation.
        size: usize,
    },
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                largest_free,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, largest free block {largest_free} bytes"
                )
            }
            Self::InvalidPointer { offset } => {
                write!(f, "invalid pointer: offset {offset} is not a live allocation")
            }
            Self::RangeExceeded { offset, len, size } => {
                write!(
                    f,
                    "range exceeded: {len} bytes at offset {offset}, payload is {size} bytes"
                )
            }
        }
    }
}

impl Error for HeapError {}

/// Errors detected by [`HeapConfig::validate()`](crate::HeapConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The arena cannot hold a single header plus one payload byte.
    CapacityTooSmall {
        /// The configured capacity.
        capacity: usize,
        /// Smallest accepted capacity.
        minimum: usize,
    },
    /// Block sizes would not fit the on-arena header encoding.
    CapacityTooLarge {
        /// The configured capacity.
        capacity: usize,
        /// Largest accepted capacity.
        maximum: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityTooSmall { capacity, minimum } => {
                write!(
                    f,
                    "heap capacity {capacity} bytes is below the minimum of {minimum} bytes"
                )
            }
            Self::CapacityTooLarge { capacity, maximum } => {
                write!(
                    f,
                    "heap capacity {capacity} bytes exceeds the maximum of {maximum} bytes"
                )
            }
        }
    }
}

impl Error for ConfigError {}

/// A broken structural invariant found by [`Heap::verify()`](crate::Heap::verify).
///
/// Offsets are header offsets within the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutViolation {
    /// The first block does not start at offset 0.
    MisplacedHead {
        /// Where the list actually starts.
        offset: usize,
    },
    /// A block's `next` link does not start right after its payload.
    Gap {
        /// The block whose link is wrong.
        block: usize,
        /// Offset the next header should have.
        expected: usize,
        /// Offset the link actually holds.
        actual: usize,
    },
    /// A block extends past the end of the arena.
    Overrun {
        /// The offending block.
        block: usize,
        /// One past its last payload byte.
        end: usize,
        /// Arena capacity.
        capacity: usize,
    },
    /// The last block ends before the arena does.
    ShortCoverage {
        /// Bytes covered by the list.
        covered: usize,
        /// Arena capacity.
        capacity: usize,
    },
    /// Two neighbouring blocks are both free.
    AdjacentFree {
        /// The first free block.
        first: usize,
        /// The free block that follows it.
        second: usize,
    },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MisplacedHead { offset } => {
                write!(f, "block list starts at offset {offset}, expected 0")
            }
            Self::Gap {
                block,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "block at {block} links to {actual}, expected {expected}"
                )
            }
            Self::Overrun {
                block,
                end,
                capacity,
            } => {
                write!(
                    f,
                    "block at {block} ends at {end}, past arena capacity {capacity}"
                )
            }
            Self::ShortCoverage { covered, capacity } => {
                write!(f, "blocks cover {covered} of {capacity} arena bytes")
            }
            Self::AdjacentFree { first, second } => {
                write!(f, "adjacent free blocks at {first} and {second}")
            }
        }
    }
}

impl Error for LayoutViolation {}
