//! Block headers and their in-arena encoding.
//!
//! Every block starts with a fixed [`HEADER_SIZE`]-byte header stored inside
//! the arena itself, immediately followed by the block's payload:
//!
//! ```text
//! offset  0        4        8                16
//!         +--------+--------+----------------+-------------
//!         |  size  | flags  |      next      | payload ...
//!         +--------+--------+----------------+-------------
//!           u32 LE   u32 LE       u64 LE
//! ```
//!
//! `flags` bit 0 is the free flag. `next` holds the arena offset of the
//! following header, or `u64::MAX` for the last block.

/// Size in bytes of the header that prefixes every payload.
pub const HEADER_SIZE: usize = 16;

const FLAG_FREE: u32 = 1;
const NO_NEXT: u64 = u64::MAX;

/// Decoded view of a block header.
///
/// Headers are plain values: reading one copies it out of the arena and
/// changes only take effect once written back with [`BlockHeader::write`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    /// Usable payload bytes, not counting the header.
    pub(crate) size: usize,
    /// Whether the payload is available for reuse.
    pub(crate) is_free: bool,
    /// Arena offset of the following block's header.
    pub(crate) next: Option<usize>,
}

impl BlockHeader {
    /// A header for a free block of `size` payload bytes.
    pub(crate) fn free(size: usize, next: Option<usize>) -> Self {
        Self {
            size,
            is_free: true,
            next,
        }
    }

    /// Decode a header from the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`HEADER_SIZE`].
    pub(crate) fn read(bytes: &[u8]) -> Self {
        let size = read_u32(bytes, 0) as usize;
        let flags = read_u32(bytes, 4);
        let next = read_u64(bytes, 8);
        Self {
            size,
            is_free: flags & FLAG_FREE != 0,
            next: (next != NO_NEXT).then_some(next as usize),
        }
    }

    /// Encode this header into the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than [`HEADER_SIZE`].
    pub(crate) fn write(&self, bytes: &mut [u8]) {
        debug_assert!(self.size <= u32::MAX as usize);
        let flags = if self.is_free { FLAG_FREE } else { 0 };
        let next = self.next.map_or(NO_NEXT, |n| n as u64);
        bytes[0..4].copy_from_slice(&(self.size as u32).to_le_bytes());
        bytes[4..8].copy_from_slice(&flags.to_le_bytes());
        bytes[8..16].copy_from_slice(&next.to_le_bytes());
    }

    /// Offset one past this block's last payload byte, given its own offset.
    pub(crate) fn end(&self, at: usize) -> usize {
        at + HEADER_SIZE + self.size
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}
