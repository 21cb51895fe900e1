//! First-fit allocation over a single fixed-capacity byte arena.
//!
//! A [`Heap`] owns one contiguous byte buffer, allocated once at
//! construction and never grown or moved, and hands out pieces of it
//! without touching the global allocator. References are arena-relative
//! offsets ([`HeapPtr`]), so the crate contains no `unsafe` code.
//!
//! # Architecture
//!
//! The arena is partitioned by an intrusive, address-ordered block list:
//!
//! ```text
//! arena (capacity bytes)
//! ├── Block 0: [header | payload .........]   used
//! ├── Block 1: [header | payload ...]         free
//! ├── Block 2: [header | payload .....]       used
//! └── Block n: [header | payload ..........]  free (tail)
//! ```
//!
//! Each header records the payload size, a free flag, and the offset of the
//! next header (see [`header`] for the byte layout). The list covers the
//! arena exactly, with no gaps or overlaps.
//!
//! # Operations
//!
//! - **allocate:** first-fit scan. An exact fit is taken whole; a larger
//!   block is split if the remainder can hold a header and at least one byte.
//! - **release:** marks the block free, then coalesces adjacent free blocks.
//! - **resize:** allocate, copy `min(old, new)` bytes, release the old block.
//!   The original stays valid if the new allocation fails.
//! - **size_of / owns / bytes_in_use:** queries; [`Heap::verify`] checks the
//!   structural invariants and [`Heap::stats`] summarizes occupancy.
//!
//! ```
//! use fitheap::Heap;
//!
//! let mut heap = Heap::with_capacity(1024).unwrap();
//! let ptr = heap.allocate(100).unwrap();
//! heap.payload_mut(ptr).unwrap()[0] = 42;
//! assert_eq!(heap.bytes_in_use(), 100);
//! heap.release(ptr).unwrap();
//! assert_eq!(heap.bytes_in_use(), 0);
//! ```
//!
//! The heap is single-threaded: mutating operations take `&mut self` and
//! callers that share one across threads supply their own lock.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
mod check;
pub mod config;
pub mod error;
pub mod header;
pub mod heap;
pub mod ptr;
pub mod stats;

// Public re-exports for the primary API surface.
pub use block::{BlockInfo, Blocks};
pub use config::HeapConfig;
pub use error::{ConfigError, HeapError, LayoutViolation};
pub use header::HEADER_SIZE;
pub use heap::Heap;
pub use ptr::HeapPtr;
pub use stats::HeapStats;
