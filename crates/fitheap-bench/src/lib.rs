//! Benchmark profiles for the fitheap allocator.
//!
//! Each profile pairs an arena capacity with a seeded workload:
//!
//! - [`reference_profile`]: 1 MiB arena, mixed sizes up to 4 KiB.
//! - [`fragmentation_profile`]: 64 KiB arena, small sizes, release-heavy,
//!   so the block list stays long and first-fit scans are expensive.
//! - [`prefilled_heap`]: a heap already split into many used blocks.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fitheap::{Heap, HeapConfig, HeapPtr};
use fitheap_test_utils::{Op, WorkloadConfig};

/// A capacity plus the ops to run against it.
pub struct Profile {
    /// Arena size in bytes.
    pub capacity: usize,
    /// Pre-generated workload.
    pub ops: Vec<Op>,
}

impl Profile {
    /// A fresh heap sized for this profile.
    pub fn heap(&self) -> Heap {
        Heap::with_capacity(self.capacity).expect("profile capacities are valid")
    }
}

/// 1 MiB arena, 10K ops, sizes 1..=4096.
pub fn reference_profile(seed: u64) -> Profile {
    let config = WorkloadConfig {
        ops: 10_000,
        max_size: 4096,
        ..WorkloadConfig::default()
    };
    Profile {
        capacity: HeapConfig::DEFAULT_CAPACITY,
        ops: config.generate(seed),
    }
}

/// 64 KiB arena, 10K ops, sizes 1..=64, releases as common as allocations.
pub fn fragmentation_profile(seed: u64) -> Profile {
    let config = WorkloadConfig {
        ops: 10_000,
        max_size: 64,
        allocate_weight: 3,
        release_weight: 3,
        resize_weight: 1,
        ..WorkloadConfig::default()
    };
    Profile {
        capacity: 64 * 1024,
        ops: config.generate(seed),
    }
}

/// A heap of `capacity` bytes holding `count` used blocks of `size` bytes.
///
/// Returns the heap and the payload references in address order. Stops
/// early if the arena fills up.
pub fn prefilled_heap(capacity: usize, count: usize, size: usize) -> (Heap, Vec<HeapPtr>) {
    let mut heap = Heap::with_capacity(capacity).expect("capacity must be valid");
    let ptrs: Vec<HeapPtr> = (0..count)
        .map_while(|_| heap.allocate(size).ok())
        .collect();
    (heap, ptrs)
}
