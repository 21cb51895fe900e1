//! Seeded workload generation.
//!
//! Workloads are plain `Vec<Op>` values produced from a ChaCha8 RNG, so the
//! same seed and config always yield the same sequence. Release and resize
//! ops name a *slot* that is resolved against the live allocation list at
//! replay time (`slot % live.len()`), which keeps every generated op
//! meaningful regardless of which earlier allocations failed.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate `size` bytes.
    Allocate { size: usize },
    /// Release the live allocation at `slot`.
    Release { slot: usize },
    /// Resize the live allocation at `slot` to `size` bytes.
    Resize { slot: usize, size: usize },
}

/// Shape of a generated workload.
///
/// Weights are relative: with the defaults, allocations are twice as likely
/// as releases and four times as likely as resizes.
#[derive(Clone, Debug)]
pub struct WorkloadConfig {
    /// Number of ops to generate.
    pub ops: usize,
    /// Smallest allocation or resize size (inclusive).
    pub min_size: usize,
    /// Largest allocation or resize size (inclusive).
    pub max_size: usize,
    pub allocate_weight: u32,
    pub release_weight: u32,
    pub resize_weight: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ops: 1_000,
            min_size: 1,
            max_size: 512,
            allocate_weight: 4,
            release_weight: 2,
            resize_weight: 1,
        }
    }
}

impl WorkloadConfig {
    /// Generate the op sequence for `seed`.
    ///
    /// # Panics
    ///
    /// Panics if all weights are zero or `min_size > max_size`.
    pub fn generate(&self, seed: u64) -> Vec<Op> {
        let total_weight = self.allocate_weight + self.release_weight + self.resize_weight;
        assert!(total_weight > 0, "workload weights must not all be zero");
        assert!(
            self.min_size <= self.max_size,
            "min_size {} exceeds max_size {}",
            self.min_size,
            self.max_size,
        );

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let span = (self.max_size - self.min_size) as u64 + 1;
        let size = |rng: &mut ChaCha8Rng| self.min_size + (rng.next_u64() % span) as usize;

        (0..self.ops)
            .map(|_| {
                let pick = rng.next_u32() % total_weight;
                if pick < self.allocate_weight {
                    Op::Allocate { size: size(&mut rng) }
                } else if pick < self.allocate_weight + self.release_weight {
                    Op::Release {
                        slot: rng.next_u32() as usize,
                    }
                } else {
                    Op::Resize {
                        slot: rng.next_u32() as usize,
                        size: size(&mut rng),
                    }
                }
            })
            .collect()
    }
}
