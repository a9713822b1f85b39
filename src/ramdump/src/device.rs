//! Kcore device access
//!
//! Wraps the open `/proc/kcore` handle behind an absolute-offset read API.
//! kcore reports no usable size and no conventional EOF, so every consumer
//! states the offset it wants instead of relying on a file position left
//! behind by an earlier phase.

use std::io::{Read, Seek, SeekFrom};

use crate::{Error, Result};

/// Owns the seekable handle to the kernel memory device.
pub struct KcoreDevice<R> {
    inner: R,
}

impl<R: Read + Seek> KcoreDevice<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read exactly `buf.len()` bytes at `offset`.
    ///
    /// Running out of data before the buffer is full is a [`Error::ShortRead`].
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            let n = self.inner.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(Error::ShortRead {
                    needed: buf.len(),
                    actual: filled,
                });
            }
            filled += n;
        }

        Ok(())
    }

    /// Read up to `buf.len()` bytes at `offset`, returning the count read.
    ///
    /// Short reads are legal here; the dump path forwards whatever the
    /// device produced for a chunk and asks again for the rest.
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(self.inner.read(buf)?)
    }

    /// Consume the device and hand the handle back.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_exact_at() {
        let mut device = KcoreDevice::new(Cursor::new(b"abcdefgh".to_vec()));

        let mut buf = [0u8; 3];
        device.read_exact_at(2, &mut buf).unwrap();
        assert_eq!(&buf, b"cde");

        // Position is never inherited between calls
        device.read_exact_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn test_read_exact_at_short() {
        let mut device = KcoreDevice::new(Cursor::new(b"abcd".to_vec()));

        let mut buf = [0u8; 8];
        let err = device.read_exact_at(2, &mut buf).unwrap_err();
        match err {
            Error::ShortRead { needed: 8, actual: 2 } => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_read_at_partial() {
        let mut device = KcoreDevice::new(Cursor::new(b"abcd".to_vec()));

        let mut buf = [0u8; 8];
        let n = device.read_at(1, &mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..n], b"bcd");
    }
}
