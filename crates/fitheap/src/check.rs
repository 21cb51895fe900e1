//! Structural invariant checking.

use crate::error::LayoutViolation;
use crate::header::HEADER_SIZE;
use crate::heap::Heap;

impl Heap {
    /// Check that the block list partitions the arena exactly and that no
    /// two neighbouring blocks are both free.
    ///
    /// An uninitialized heap has no blocks and always passes. The walk stops
    /// at the first violation found.
    pub fn verify(&self) -> Result<(), LayoutViolation> {
        let Some(head) = self.head() else {
            return Ok(());
        };
        if head != 0 {
            return Err(LayoutViolation::MisplacedHead { offset: head });
        }

        let capacity = self.capacity();
        let mut at = head;
        let mut previous_free: Option<usize> = None;
        loop {
            // A header that would not fit cannot be decoded safely.
            if at + HEADER_SIZE > capacity {
                return Err(LayoutViolation::Overrun {
                    block: at,
                    end: at + HEADER_SIZE,
                    capacity,
                });
            }
            let header = self.header(at);
            let end = header.end(at);
            if end > capacity {
                return Err(LayoutViolation::Overrun {
                    block: at,
                    end,
                    capacity,
                });
            }

            if header.is_free {
                if let Some(first) = previous_free {
                    return Err(LayoutViolation::AdjacentFree { first, second: at });
                }
                previous_free = Some(at);
            } else {
                previous_free = None;
            }

            match header.next {
                Some(next) if next != end => {
                    return Err(LayoutViolation::Gap {
                        block: at,
                        expected: end,
                        actual: next,
                    });
                }
                Some(next) => at = next,
                None if end != capacity => {
                    return Err(LayoutViolation::ShortCoverage {
                        covered: end,
                        capacity,
                    });
                }
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::BlockHeader;

    fn corrupt(heap: &mut Heap, at: usize, header: BlockHeader) {
        heap.write_header(at, &header);
    }

    #[test]
    fn uninitialized_heap_passes() {
        let heap = Heap::with_capacity(128).unwrap();
        assert_eq!(heap.verify(), Ok(()));
    }

    #[test]
    fn freshly_split_heap_passes() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(100).unwrap();
        heap.allocate(1).unwrap();
        assert_eq!(heap.verify(), Ok(()));
    }

    #[test]
    fn detects_gap_between_blocks() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(500).unwrap();
        let second = heap.allocate(10).unwrap();
        // Shrink the second block's recorded size so its link no longer
        // lines up with the end of its payload.
        let at = second.offset() - HEADER_SIZE;
        corrupt(
            &mut heap,
            at,
            BlockHeader {
                size: 5,
                is_free: false,
                next: Some(at + HEADER_SIZE + 10),
            },
        );
        assert_eq!(
            heap.verify(),
            Err(LayoutViolation::Gap {
                block: at,
                expected: at + HEADER_SIZE + 5,
                actual: at + HEADER_SIZE + 10,
            })
        );
    }

    #[test]
    fn detects_adjacent_free_blocks() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(500).unwrap();
        let second = heap.allocate(10).unwrap();
        let at = second.offset() - HEADER_SIZE;
        let tail = at + HEADER_SIZE + 10;
        corrupt(&mut heap, at, BlockHeader::free(10, Some(tail)));
        assert_eq!(
            heap.verify(),
            Err(LayoutViolation::AdjacentFree {
                first: at,
                second: tail,
            })
        );
    }

    #[test]
    fn detects_short_coverage() {
        let mut heap = Heap::with_capacity(1024).unwrap();
        heap.allocate(500).unwrap();
        let second = heap.allocate(10).unwrap();
        let at = second.offset() - HEADER_SIZE;
        corrupt(
            &mut heap,
            at,
            BlockHeader {
                size: 10,
                is_free: false,
                next: None,
            },
        );
        assert_eq!(
            heap.verify(),
            Err(LayoutViolation::ShortCoverage {
                covered: at + HEADER_SIZE + 10,
                capacity: 1024,
            })
        );
    }
}
