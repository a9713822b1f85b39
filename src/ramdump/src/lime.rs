//! LiME dump container writing
//!
//! The output image is a sequence of `(header, payload)` pairs, one per
//! matched section, with no delimiters between them. The header layout
//! follows the LiME format documentation:
//!
//! ```text
//! magic(u32) | version(u32) | s_addr(u64) | e_addr(u64) | reserved(8 bytes)
//! ```
//!
//! All fields little-endian, packed, 32 bytes total.

use std::io::{Read, Seek, Write};

use byteorder::{ByteOrder, LE};

use crate::device::KcoreDevice;
use crate::section::Section;
use crate::{Error, Result};

/// LiME header magic: "EMiL" on disk.
pub const LIME_MAGIC: u32 = 0x4c69_4d45;

/// LiME header version this writer emits.
pub const LIME_VERSION: u32 = 1;

/// Size of a serialized range header.
pub const HEADER_SIZE: usize = 32;

/// Chunk size for streaming section payloads (1 MiB).
pub const CHUNK_SIZE: usize = 0x10_0000;

/// LiME memory range header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeHeader {
    pub magic: u32,
    pub version: u32,
    /// Starting physical address of the range
    pub s_addr: u64,
    /// Ending physical address of the range (inclusive)
    pub e_addr: u64,
}

impl RangeHeader {
    /// Header describing one matched section.
    pub fn for_section(section: &Section) -> Self {
        Self {
            magic: LIME_MAGIC,
            version: LIME_VERSION,
            s_addr: section.physical_base,
            e_addr: section.end_addr(),
        }
    }

    /// Serialize to the packed on-disk layout.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        LE::write_u32(&mut buf[0..4], self.magic);
        LE::write_u32(&mut buf[4..8], self.version);
        LE::write_u64(&mut buf[8..16], self.s_addr);
        LE::write_u64(&mut buf[16..24], self.e_addr);
        // bytes 24..32 are reserved and stay zero
        buf
    }

    /// Parse a packed header back out of a produced image.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::ShortRead {
                needed: HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            magic: LE::read_u32(&data[0..4]),
            version: LE::read_u32(&data[4..8]),
            s_addr: LE::read_u64(&data[8..16]),
            e_addr: LE::read_u64(&data[16..24]),
        })
    }
}

/// Write one section to the sink as `header ++ payload`.
///
/// Returns the number of bytes written (`HEADER_SIZE + section.size`).
pub fn write_section<R, W>(
    device: &mut KcoreDevice<R>,
    out: &mut W,
    section: &Section,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    out.write_all(&RangeHeader::for_section(section).to_bytes())?;
    copy_section_bytes(device, out, section)?;
    Ok(HEADER_SIZE as u64 + section.size)
}

/// Write every section to the sink in order, returning total bytes written.
///
/// On error the sink is left holding whatever was already written: a
/// truncated image is the documented failure artifact and is never cleaned
/// up here.
pub fn write_dump<R, W>(
    device: &mut KcoreDevice<R>,
    out: &mut W,
    sections: &[Section],
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    let mut total = 0u64;
    for section in sections {
        total += write_section(device, out, section)?;
    }
    Ok(total)
}

/// Stream exactly `section.size` bytes from the device to the sink through
/// a fixed chunk buffer. Partial chunk reads are accepted and retried for
/// the remainder; a read that produces nothing is a short read.
fn copy_section_bytes<R, W>(
    device: &mut KcoreDevice<R>,
    out: &mut W,
    section: &Section,
) -> Result<()>
where
    R: Read + Seek,
    W: Write,
{
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut position = section.file_offset;
    let mut remaining = section.size;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let got = device.read_at(position, &mut buffer[..want])?;
        if got == 0 {
            return Err(Error::ShortRead {
                needed: want,
                actual: 0,
            });
        }

        out.write_all(&buffer[..got])?;
        position += got as u64;
        remaining -= got as u64;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn section(physical_base: u64, file_offset: u64, size: u64) -> Section {
        Section {
            physical_base,
            file_offset,
            size,
        }
    }

    /// Deterministic non-repeating-ish payload.
    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_header_layout() {
        let header = RangeHeader::for_section(&section(0x1000, 0, 0x2000));
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..4], &[0x45, 0x4d, 0x69, 0x4c]); // "EMiL"
        assert_eq!(&bytes[4..8], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[8..16], &0x1000u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &0x2fffu64.to_le_bytes());
        assert_eq!(&bytes[24..32], &[0u8; 8]);
    }

    #[test]
    fn test_header_round_trip() {
        let header = RangeHeader::for_section(&section(0x1_0000_0000, 0x4000, 0x8000_0000));
        let parsed = RangeHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_from_short_buffer() {
        let err = RangeHeader::from_bytes(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::ShortRead { .. }));
    }

    #[test]
    fn test_write_section_round_trip() {
        // 2.5 chunks forces the copy loop through full and partial chunks
        let size = CHUNK_SIZE * 2 + CHUNK_SIZE / 2;
        let data = payload(size);
        let mut device = KcoreDevice::new(Cursor::new(data.clone()));

        let mut out = Vec::new();
        let written =
            write_section(&mut device, &mut out, &section(0x1000, 0, size as u64)).unwrap();

        assert_eq!(written, (HEADER_SIZE + size) as u64);
        assert_eq!(out.len(), HEADER_SIZE + size);
        assert_eq!(&out[HEADER_SIZE..], &data[..]);

        let header = RangeHeader::from_bytes(&out[..HEADER_SIZE]).unwrap();
        assert_eq!(header.s_addr, 0x1000);
        assert_eq!(header.e_addr, 0x1000 + size as u64 - 1);
    }

    #[test]
    fn test_write_section_honors_file_offset() {
        let mut data = vec![0xaa; 0x100];
        data.extend_from_slice(b"wanted bytes");
        let mut device = KcoreDevice::new(Cursor::new(data));

        let mut out = Vec::new();
        write_section(&mut device, &mut out, &section(0x8000, 0x100, 12)).unwrap();

        assert_eq!(&out[HEADER_SIZE..], b"wanted bytes");
    }

    #[test]
    fn test_write_dump_concatenates_in_order() {
        let data = payload(0x3000);
        let mut device = KcoreDevice::new(Cursor::new(data.clone()));

        let sections = [section(0x1000, 0, 0x1000), section(0x9000, 0x2000, 0x800)];
        let mut out = Vec::new();
        let total = write_dump(&mut device, &mut out, &sections).unwrap();

        assert_eq!(total, (2 * HEADER_SIZE + 0x1000 + 0x800) as u64);
        assert_eq!(out.len() as u64, total);

        let first = RangeHeader::from_bytes(&out[..HEADER_SIZE]).unwrap();
        assert_eq!(first.s_addr, 0x1000);
        assert_eq!(&out[HEADER_SIZE..HEADER_SIZE + 0x1000], &data[..0x1000]);

        let second_at = HEADER_SIZE + 0x1000;
        let second = RangeHeader::from_bytes(&out[second_at..second_at + HEADER_SIZE]).unwrap();
        assert_eq!(second.s_addr, 0x9000);
        assert_eq!(second.e_addr, 0x97ff);
        assert_eq!(&out[second_at + HEADER_SIZE..], &data[0x2000..0x2800]);
    }

    #[test]
    fn test_short_device_leaves_truncated_output() {
        // Device holds less than the section claims; output keeps what was
        // written before the failure.
        let mut device = KcoreDevice::new(Cursor::new(payload(0x100)));

        let mut out = Vec::new();
        let err = write_dump(&mut device, &mut out, &[section(0x1000, 0, 0x1000)]).unwrap_err();

        assert!(matches!(err, Error::ShortRead { .. }));
        assert_eq!(out.len(), HEADER_SIZE + 0x100);
    }

    #[test]
    fn test_dump_to_disk() {
        let size = CHUNK_SIZE + 17;
        let data = payload(size);
        let mut device = KcoreDevice::new(Cursor::new(data.clone()));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write_dump(&mut device, &mut file, &[section(0x2000, 0, size as u64)]).unwrap();
        file.flush().unwrap();

        let image = std::fs::read(file.path()).unwrap();
        assert_eq!(image.len(), HEADER_SIZE + size);
        assert_eq!(&image[HEADER_SIZE..], &data[..]);
    }
}
