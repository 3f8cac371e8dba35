//! Buffer management strategies for update encoding
//!
//! A [`BufferManager`] decides how encoded bytes are stored and how capacity
//! is reserved. Two strategies are built in: [`FixedBuffer`] appends into a
//! caller-owned slice and fails when it is full, [`GrowableBuffer`] owns a
//! `Vec` and doubles its capacity on demand. A custom strategy (say, one that
//! streams straight into a file) only has to implement the same small
//! capability set.

use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Strategy for storing encoded bytes and reserving capacity
///
/// Writers always call [`assure_space`](Self::assure_space) before a write
/// sequence; `write_byte`/`write_bytes` may assume the space is there and are
/// infallible. Encoders rely on this split for all-or-nothing semantics: the
/// single reservation up front is the only point of failure, so a failed
/// multi-field write leaves `used` exactly as it was.
pub trait BufferManager {
    /// Make sure at least `needed` more bytes can be appended
    fn assure_space(&mut self, needed: usize) -> Result<()>;

    /// Append one byte; space must have been assured
    fn write_byte(&mut self, byte: u8);

    /// Append a run of bytes; space must have been assured
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Number of valid bytes written so far
    fn used(&self) -> usize;

    /// Current allocated capacity in bytes
    fn capacity(&self) -> usize;

    /// The encoded bytes written so far
    fn as_slice(&self) -> &[u8];
}

/// Fixed-capacity strategy over a caller-owned slice
///
/// Never reallocates; `assure_space` fails once the slice cannot hold the
/// request. Suited to static buffers on embedded targets where the caller
/// imposes a hard upper bound.
pub struct FixedBuffer<'a> {
    buf: &'a mut [u8],
    used: usize,
}

impl<'a> FixedBuffer<'a> {
    /// Create a fixed strategy borrowing the given storage
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, used: 0 }
    }
}

impl BufferManager for FixedBuffer<'_> {
    #[inline]
    fn assure_space(&mut self, needed: usize) -> Result<()> {
        if self.used + needed > self.buf.len() {
            return Err(Error::Allocation);
        }
        Ok(())
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) {
        self.buf[self.used] = byte;
        self.used += 1;
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf[self.used..self.used + bytes.len()].copy_from_slice(bytes);
        self.used += bytes.len();
    }

    #[inline]
    fn used(&self) -> usize {
        self.used
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.used]
    }
}

/// Growth-by-doubling strategy over an owned `Vec`
///
/// Capacity starts at a 1024-byte baseline and doubles until a reservation
/// fits; fails only if the allocator refuses. The backing storage is released
/// when the buffer is dropped, or handed to the caller via
/// [`into_vec`](Self::into_vec).
#[derive(Default)]
pub struct GrowableBuffer {
    buf: Vec<u8>,
}

impl GrowableBuffer {
    /// Baseline capacity for the first allocation
    pub const BASELINE_CAPACITY: usize = 1024;

    /// Create an empty growable buffer; nothing is allocated until first use
    #[inline]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consume the strategy and take the encoded bytes
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl BufferManager for GrowableBuffer {
    fn assure_space(&mut self, needed: usize) -> Result<()> {
        let used = self.buf.len();
        let mut size = self.buf.capacity().max(Self::BASELINE_CAPACITY);

        while size - used < needed {
            size = size.checked_mul(2).ok_or(Error::Allocation)?;
        }

        if size > self.buf.capacity() {
            self.buf
                .try_reserve_exact(size - used)
                .map_err(|_| Error::Allocation)?;
        }

        Ok(())
    }

    #[inline]
    fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    fn used(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_appends_and_tracks_used() {
        let mut storage = [0u8; 8];
        let mut buf = FixedBuffer::new(&mut storage);

        buf.assure_space(3).unwrap();
        buf.write_byte(0xAB);
        buf.write_bytes(&[0x01, 0x02]);

        assert_eq!(buf.used(), 3);
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.as_slice(), &[0xAB, 0x01, 0x02]);
    }

    #[test]
    fn test_fixed_rejects_overflow() {
        let mut storage = [0u8; 4];
        let mut buf = FixedBuffer::new(&mut storage);

        buf.assure_space(4).unwrap();
        assert_eq!(buf.assure_space(5), Err(Error::Allocation));

        buf.write_bytes(&[1, 2, 3, 4]);
        assert_eq!(buf.assure_space(1), Err(Error::Allocation));
        assert_eq!(buf.used(), 4);
    }

    #[test]
    fn test_growable_starts_at_baseline() {
        let mut buf = GrowableBuffer::new();
        assert_eq!(buf.capacity(), 0);

        buf.assure_space(1).unwrap();
        assert!(buf.capacity() >= GrowableBuffer::BASELINE_CAPACITY);

        buf.write_byte(7);
        assert_eq!(buf.as_slice(), &[7]);
    }

    #[test]
    fn test_growable_doubles_past_baseline() {
        let mut buf = GrowableBuffer::new();
        buf.assure_space(GrowableBuffer::BASELINE_CAPACITY * 3).unwrap();
        assert!(buf.capacity() >= GrowableBuffer::BASELINE_CAPACITY * 3);
    }

    #[test]
    fn test_growable_preserves_existing_bytes_across_growth() {
        let mut buf = GrowableBuffer::new();
        buf.assure_space(4).unwrap();
        buf.write_bytes(&[9, 8, 7, 6]);

        buf.assure_space(GrowableBuffer::BASELINE_CAPACITY * 2).unwrap();
        assert_eq!(&buf.as_slice()[..4], &[9, 8, 7, 6]);

        let v = buf.into_vec();
        assert_eq!(v, [9, 8, 7, 6]);
    }
}
