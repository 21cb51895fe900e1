//! Integration test: end-to-end allocator scenarios through the public API.

use fitheap::{Heap, HeapConfig, HeapError, HeapPtr, HEADER_SIZE};

const H: usize = HEADER_SIZE;

#[test]
fn documented_example_scenario() {
    let mut heap = Heap::with_capacity(1024).unwrap();

    let first = heap.allocate(100).unwrap();
    assert_eq!(first.offset(), H);

    let second = heap.allocate(200).unwrap();
    assert_eq!(second.offset(), 2 * H + 100);

    heap.release(first).unwrap();
    let blocks: Vec<_> = heap.blocks().collect();
    assert!(blocks[0].is_free);
    assert!(!blocks[1].is_free);
    assert_eq!(blocks.len(), 3);

    let reused = heap.allocate(100).unwrap();
    assert_eq!(reused.offset(), H);
    assert_eq!(heap.verify(), Ok(()));
}

#[test]
fn exact_fit_reuse_keeps_block_count() {
    let mut heap = Heap::default();
    let a = heap.allocate(4000).unwrap();
    let _guard = heap.allocate(1).unwrap();
    let count = heap.blocks().count();

    heap.release(a).unwrap();
    let b = heap.allocate(4000).unwrap();
    assert_eq!(a, b);
    assert_eq!(heap.blocks().count(), count);
}

#[test]
fn partition_covers_whole_arena() {
    let mut heap = Heap::new(HeapConfig::new(8192)).unwrap();
    let mut ptrs = Vec::new();
    for size in [1, 7, 64, 300, 999, 12] {
        ptrs.push(heap.allocate(size).unwrap());
    }
    heap.release(ptrs[2]).unwrap();
    heap.release(ptrs[4]).unwrap();

    let covered: usize = heap.blocks().map(|b| H + b.size).sum();
    assert_eq!(covered, 8192);
    assert_eq!(heap.verify(), Ok(()));
}

#[test]
fn queries_reject_foreign_offsets() {
    let mut heap = Heap::with_capacity(512).unwrap();
    heap.allocate(32).unwrap();
    for offset in [512, 513, 4096, usize::MAX] {
        let ptr = HeapPtr::from_offset(offset);
        assert!(!heap.owns(ptr));
        assert_eq!(heap.size_of(ptr), Err(HeapError::InvalidPointer { offset }));
        assert_eq!(heap.release(ptr), Err(HeapError::InvalidPointer { offset }));
        assert_eq!(
            heap.resize(ptr, 8),
            Err(HeapError::InvalidPointer { offset })
        );
    }
    assert_eq!(heap.bytes_in_use(), 32);
}

#[test]
fn growing_a_buffer_preserves_contents() {
    let mut heap = Heap::with_capacity(4096).unwrap();
    let mut ptr = heap.allocate(1).unwrap();
    heap.payload_mut(ptr).unwrap()[0] = 0;

    for len in 2..=64u8 {
        ptr = heap.resize(ptr, len as usize).unwrap();
        heap.payload_mut(ptr).unwrap()[len as usize - 1] = len - 1;
    }

    let expected: Vec<u8> = (0..64).collect();
    assert_eq!(heap.payload(ptr).unwrap(), expected.as_slice());
    assert_eq!(heap.bytes_in_use(), 64);
    assert_eq!(heap.verify(), Ok(()));
}

#[test]
fn stats_reflect_fragmentation() {
    let mut heap = Heap::with_capacity(4096).unwrap();
    let ptrs: Vec<_> = (0..10).map(|_| heap.allocate(100).unwrap()).collect();
    for ptr in ptrs.iter().step_by(2) {
        heap.release(*ptr).unwrap();
    }

    let stats = heap.stats();
    assert_eq!(stats.bytes_in_use, 500);
    assert_eq!(stats.free_block_count, 6);
    assert!(stats.largest_free < stats.bytes_free);
    assert_eq!(stats.total_requested, 1000);
}
