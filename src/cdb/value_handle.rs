use memmap2::Mmap;
use std::ops::Range;
use std::sync::Arc;

/// Zero-copy owner of a value's byte range inside the shared memory map.
///
/// A handle keeps the underlying map alive for as long as it exists, so the
/// returned bytes stay valid even after the [`crate::CdbReader`] that
/// produced it is dropped.
pub struct ValueHandle {
    pub(in crate::cdb) mmap: Arc<Mmap>,
    pub(in crate::cdb) range: Range<usize>,
}

impl ValueHandle {
    /// The exact value bytes, referencing the memory-mapped file directly.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[self.range.clone()]
    }

    /// Length of the value in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Absolute file offset where the value bytes begin.
    pub fn position(&self) -> usize {
        self.range.start
    }

    /// Copies the value into an owned buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
}

/// Enable `*handle` to act like a `&[u8]`.
impl std::ops::Deref for ValueHandle {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::fmt::Debug for ValueHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueHandle")
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Let us do: `assert_eq!(handle, b"some bytes".as_slice())`
impl PartialEq<[u8]> for ValueHandle {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl PartialEq<&[u8]> for ValueHandle {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_slice() == *other
    }
}

impl PartialEq<Vec<u8>> for ValueHandle {
    fn eq(&self, other: &Vec<u8>) -> bool {
        self.as_slice() == other.as_slice()
    }
}
