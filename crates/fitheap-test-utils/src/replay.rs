//! Workload replay against a shadow model.
//!
//! [`Replay`] applies [`Op`]s to a [`Heap`] and keeps its own record of
//! every live allocation. Each allocation's payload is filled with a tag
//! byte so that overlapping blocks or a bad resize copy show up as
//! corrupted payloads. In checked mode every step is followed by
//! [`Heap::verify`], an occupancy comparison and a payload scan.

use std::error::Error;
use std::fmt;

use fitheap::{Heap, HeapError, HeapPtr, LayoutViolation};

use crate::workload::Op;

/// An allocation the replay believes is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveAlloc {
    pub ptr: HeapPtr,
    /// Size the allocation was requested with (zero counted as one).
    pub size: usize,
    /// Byte every payload byte should hold.
    pub tag: u8,
}

/// Counters collected over a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub allocations: usize,
    pub releases: usize,
    pub resizes: usize,
    pub out_of_memory: usize,
    /// Ops skipped because nothing was live.
    pub skipped: usize,
    pub peak_bytes_in_use: usize,
}

/// A divergence between the heap and the shadow model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// [`Heap::verify`] failed.
    Layout {
        step: usize,
        violation: LayoutViolation,
    },
    /// `bytes_in_use` disagrees with the live set.
    Accounting {
        step: usize,
        expected: usize,
        actual: usize,
    },
    /// A payload no longer holds its tag, or has the wrong size.
    Corrupted { step: usize, offset: usize },
    /// The heap returned an error the model did not expect.
    Unexpected { step: usize, error: HeapError },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout { step, violation } => {
                write!(f, "step {step}: layout violation: {violation}")
            }
            Self::Accounting {
                step,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "step {step}: bytes_in_use is {actual}, shadow model expects {expected}"
                )
            }
            Self::Corrupted { step, offset } => {
                write!(f, "step {step}: payload at offset {offset} corrupted")
            }
            Self::Unexpected { step, error } => {
                write!(f, "step {step}: unexpected heap error: {error}")
            }
        }
    }
}

impl Error for ReplayError {}

/// Drives a heap through a workload.
pub struct Replay {
    heap: Heap,
    live: Vec<LiveAlloc>,
    next_tag: u8,
    checked: bool,
    step: usize,
    report: ReplayReport,
}

impl Replay {
    /// Replay with full checking after every op.
    pub fn new(heap: Heap) -> Self {
        Self::with_checks(heap, true)
    }

    /// Replay without tagging or checking, for benchmarks.
    pub fn unchecked(heap: Heap) -> Self {
        Self::with_checks(heap, false)
    }

    fn with_checks(heap: Heap, checked: bool) -> Self {
        Self {
            heap,
            live: Vec::new(),
            next_tag: 0,
            checked,
            step: 0,
            report: ReplayReport::default(),
        }
    }

    /// The heap under test.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Allocations the shadow model considers live.
    pub fn live(&self) -> &[LiveAlloc] {
        &self.live
    }

    /// Counters so far.
    pub fn report(&self) -> &ReplayReport {
        &self.report
    }

    /// Apply every op in order, stopping at the first divergence.
    pub fn run(&mut self, ops: &[Op]) -> Result<ReplayReport, ReplayError> {
        for op in ops {
            self.apply(op)?;
        }
        Ok(self.report.clone())
    }

    /// Apply a single op.
    pub fn apply(&mut self, op: &Op) -> Result<(), ReplayError> {
        let step = self.step;
        self.step += 1;

        match *op {
            Op::Allocate { size } => match self.heap.allocate(size) {
                Ok(ptr) => {
                    let tag = self.fresh_tag();
                    self.fill(ptr, tag, step)?;
                    self.live.push(LiveAlloc {
                        ptr,
                        size: size.max(1),
                        tag,
                    });
                    self.report.allocations += 1;
                }
                Err(HeapError::OutOfMemory { .. }) => self.report.out_of_memory += 1,
                Err(error) => return Err(ReplayError::Unexpected { step, error }),
            },
            Op::Release { slot } => {
                if self.live.is_empty() {
                    self.report.skipped += 1;
                } else {
                    let alloc = self.live.swap_remove(slot % self.live.len());
                    self.heap
                        .release(alloc.ptr)
                        .map_err(|error| ReplayError::Unexpected { step, error })?;
                    self.report.releases += 1;
                }
            }
            Op::Resize { slot, size } => {
                if self.live.is_empty() {
                    self.report.skipped += 1;
                } else {
                    let index = slot % self.live.len();
                    self.resize(index, size, step)?;
                }
            }
        }

        let in_use = self.heap.bytes_in_use();
        self.report.peak_bytes_in_use = self.report.peak_bytes_in_use.max(in_use);
        if self.checked {
            self.check(step, in_use)?;
        }
        Ok(())
    }

    /// Release every live allocation, oldest slot first.
    pub fn release_all(&mut self) -> Result<(), ReplayError> {
        while !self.live.is_empty() {
            self.apply(&Op::Release { slot: 0 })?;
        }
        Ok(())
    }

    fn resize(&mut self, index: usize, size: usize, step: usize) -> Result<(), ReplayError> {
        let old = self.live[index];
        match self.heap.resize(old.ptr, size) {
            Ok(ptr) => {
                if self.checked {
                    let kept = old.size.min(size);
                    let payload = self
                        .heap
                        .payload(ptr)
                        .map_err(|error| ReplayError::Unexpected { step, error })?;
                    if payload[..kept].iter().any(|&b| b != old.tag) {
                        return Err(ReplayError::Corrupted {
                            step,
                            offset: ptr.offset(),
                        });
                    }
                }
                self.fill(ptr, old.tag, step)?;
                self.live[index] = LiveAlloc {
                    ptr,
                    size: size.max(1),
                    tag: old.tag,
                };
                self.report.resizes += 1;
            }
            Err(HeapError::OutOfMemory { .. }) => self.report.out_of_memory += 1,
            Err(error) => return Err(ReplayError::Unexpected { step, error }),
        }
        Ok(())
    }

    fn fresh_tag(&mut self) -> u8 {
        self.next_tag = self.next_tag.wrapping_add(1);
        self.next_tag
    }

    fn fill(&mut self, ptr: HeapPtr, tag: u8, step: usize) -> Result<(), ReplayError> {
        if !self.checked {
            return Ok(());
        }
        self.heap
            .payload_mut(ptr)
            .map(|payload| payload.fill(tag))
            .map_err(|error| ReplayError::Unexpected { step, error })
    }

    fn check(&self, step: usize, in_use: usize) -> Result<(), ReplayError> {
        self.heap
            .verify()
            .map_err(|violation| ReplayError::Layout { step, violation })?;

        let expected: usize = self.live.iter().map(|alloc| alloc.size).sum();
        if expected != in_use {
            return Err(ReplayError::Accounting {
                step,
                expected,
                actual: in_use,
            });
        }

        for alloc in &self.live {
            let intact = self
                .heap
                .payload(alloc.ptr)
                .map(|payload| {
                    payload.len() == alloc.size && payload.iter().all(|&b| b == alloc.tag)
                })
                .unwrap_or(false);
            if !intact {
                return Err(ReplayError::Corrupted {
                    step,
                    offset: alloc.ptr.offset(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::WorkloadConfig;

    #[test]
    fn replay_counts_ops() {
        let heap = Heap::with_capacity(4096).unwrap();
        let mut replay = Replay::new(heap);
        let report = replay
            .run(&[
                Op::Allocate { size: 100 },
                Op::Allocate { size: 200 },
                Op::Resize { slot: 0, size: 50 },
                Op::Release { slot: 1 },
            ])
            .unwrap();
        assert_eq!(report.allocations, 2);
        assert_eq!(report.resizes, 1);
        assert_eq!(report.releases, 1);
        assert_eq!(replay.live().len(), 1);
        assert_eq!(replay.heap().bytes_in_use(), 50);
    }

    #[test]
    fn release_with_nothing_live_is_skipped() {
        let mut replay = Replay::new(Heap::with_capacity(256).unwrap());
        let report = replay.run(&[Op::Release { slot: 3 }]).unwrap();
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn out_of_memory_is_counted_not_fatal() {
        let mut replay = Replay::new(Heap::with_capacity(256).unwrap());
        let report = replay.run(&[Op::Allocate { size: 10_000 }]).unwrap();
        assert_eq!(report.out_of_memory, 1);
        assert_eq!(report.allocations, 0);
    }

    #[test]
    fn release_all_empties_heap() {
        let mut replay = Replay::new(Heap::with_capacity(64 * 1024).unwrap());
        replay.run(&WorkloadConfig::default().generate(5)).unwrap();
        replay.release_all().unwrap();
        assert!(replay.live().is_empty());
        assert_eq!(replay.heap().stats().block_count, 1);
    }

    #[test]
    fn unchecked_replay_still_tracks_live_set() {
        let mut replay = Replay::unchecked(Heap::with_capacity(4096).unwrap());
        replay
            .run(&[Op::Allocate { size: 10 }, Op::Allocate { size: 20 }])
            .unwrap();
        assert_eq!(replay.live().len(), 2);
        assert_eq!(replay.report().peak_bytes_in_use, 30);
    }
}
