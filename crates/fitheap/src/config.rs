//! Heap configuration parameters.

use crate::error::ConfigError;
use crate::header::HEADER_SIZE;

/// Configuration for a [`Heap`](crate::Heap).
///
/// The capacity is fixed for the heap's lifetime: the arena is allocated
/// once at construction and never grows or moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Total arena size in bytes, headers included.
    ///
    /// Default: 1 MiB. Must be at least [`HeapConfig::MIN_CAPACITY`] and at
    /// most [`HeapConfig::MAX_CAPACITY`].
    pub capacity: usize,
}

impl HeapConfig {
    /// Default arena capacity: 1 MiB.
    pub const DEFAULT_CAPACITY: usize = 1024 * 1024;

    /// One header plus a single payload byte.
    pub const MIN_CAPACITY: usize = HEADER_SIZE + 1;

    /// Block sizes are stored as `u32` inside the arena.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a config for an arena of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check that the capacity can hold at least one block and that every
    /// block size fits the header encoding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < Self::MIN_CAPACITY {
            return Err(ConfigError::CapacityTooSmall {
                capacity: self.capacity,
                minimum: Self::MIN_CAPACITY,
            });
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.capacity,
                maximum: Self::MAX_CAPACITY,
            });
        }
        Ok(())
    }

    /// Payload bytes of the single free block the arena starts with.
    pub fn initial_payload(&self) -> usize {
        self.capacity.saturating_sub(HEADER_SIZE)
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_one_mebibyte() {
        let config = HeapConfig::default();
        assert_eq!(config.capacity, 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn initial_payload_excludes_one_header() {
        let config = HeapConfig::new(1024);
        assert_eq!(config.initial_payload(), 1024 - HEADER_SIZE);
    }

    #[test]
    fn rejects_capacity_without_room_for_a_payload_byte() {
        let err = HeapConfig::new(HEADER_SIZE).validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::CapacityTooSmall {
                capacity: HEADER_SIZE,
                minimum: HEADER_SIZE + 1,
            }
        );
    }

    #[test]
    fn accepts_minimum_capacity() {
        assert!(HeapConfig::new(HeapConfig::MIN_CAPACITY).validate().is_ok());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn rejects_capacity_beyond_header_encoding() {
        let config = HeapConfig::new(HeapConfig::MAX_CAPACITY + 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityTooLarge { .. })
        ));
    }
}
