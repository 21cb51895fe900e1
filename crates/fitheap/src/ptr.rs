//! Payload references.
//!
//! A [`HeapPtr`] names an allocation by the arena-relative offset of its
//! first payload byte. The block header always sits exactly
//! [`HEADER_SIZE`] bytes before that offset.

use std::fmt;

use crate::header::HEADER_SIZE;

/// Arena-relative reference to the payload of an allocation.
///
/// Returned by [`Heap::allocate`](crate::Heap::allocate) and
/// [`Heap::resize`](crate::Heap::resize). The value is only meaningful for
/// the heap that produced it; handing it to another heap is detected when
/// the offset does not name one of that heap's live blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[must_use]
pub struct HeapPtr(usize);

impl HeapPtr {
    /// Wrap a raw arena offset.
    ///
    /// No validation happens here; heap operations reject offsets that do
    /// not name a live allocation.
    pub fn from_offset(offset: usize) -> Self {
        Self(offset)
    }

    /// Reference to the payload of the block whose header is at `header`.
    pub(crate) fn from_header(header: usize) -> Self {
        Self(header + HEADER_SIZE)
    }

    /// Offset of the first payload byte within the arena.
    pub fn offset(&self) -> usize {
        self.0
    }

    /// Offset of the owning block's header, if the payload could have one.
    pub(crate) fn header_offset(&self) -> Option<usize> {
        self.0.checked_sub(HEADER_SIZE)
    }
}

impl fmt::Display for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapPtr(+{})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sits_one_header_before_payload() {
        let ptr = HeapPtr::from_header(64);
        assert_eq!(ptr.offset(), 64 + HEADER_SIZE);
        assert_eq!(ptr.header_offset(), Some(64));
    }

    #[test]
    fn offsets_inside_first_header_have_no_header() {
        assert_eq!(HeapPtr::from_offset(HEADER_SIZE - 1).header_offset(), None);
        assert_eq!(HeapPtr::from_offset(HEADER_SIZE).header_offset(), Some(0));
    }

    #[test]
    fn display_shows_offset() {
        assert_eq!(HeapPtr::from_offset(42).to_string(), "HeapPtr(+42)");
    }
}
