//! Bounds-checked reads and searches over an immutable byte buffer.
//!
//! Every accessor returns `None` instead of panicking when the requested
//! range does not fit, so callers turn out-of-range reads into typed errors.

use memchr::{memchr, memmem};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn u8_at(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    pub(crate) fn u16_be_at(&self, offset: usize) -> Option<u16> {
        let bytes = self.array_at::<2>(offset)?;
        Some(u16::from_be_bytes(bytes))
    }

    pub(crate) fn u16_le_at(&self, offset: usize) -> Option<u16> {
        let bytes = self.array_at::<2>(offset)?;
        Some(u16::from_le_bytes(bytes))
    }

    pub(crate) fn slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    pub(crate) fn starts_with_at(&self, offset: usize, needle: &[u8]) -> bool {
        self.slice(offset, needle.len()) == Some(needle)
    }

    /// Position of the first `byte` at or after `from`.
    pub(crate) fn find_byte(&self, byte: u8, from: usize) -> Option<usize> {
        let tail = self.data.get(from..)?;
        memchr(byte, tail).map(|pos| from + pos)
    }

    /// Position of the first occurrence of `needle` at or after `from`.
    pub(crate) fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        let tail = self.data.get(from..)?;
        memmem::find(tail, needle).map(|pos| from + pos)
    }

    fn array_at<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        self.slice(offset, N)?.try_into().ok()
    }
}
