//! `/proc/kcore` descriptor parsing
//!
//! kcore is ELF64-shaped: a standard ELF header at offset 0 describes a
//! program-header table whose entries map physical extents to offsets
//! within the kcore file representation. Only the three fields the
//! acquisition path needs are decoded from each entry.

use std::io::{Read, Seek};

use byteorder::{ByteOrder, LE};

use crate::device::KcoreDevice;
use crate::{Error, Result};

/// Path to the kernel memory pseudo-file.
pub const KCORE_PATH: &str = "/proc/kcore";

/// ELF identification magic.
const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// ELFCLASS64 identification byte.
const ELF_CLASS_64: u8 = 2;

/// Size of the ELF64 file header.
const EHDR_SIZE: usize = 64;

// ELF64 file header field offsets
const E_PHOFF: usize = 0x20;
const E_PHENTSIZE: usize = 0x36;
const E_PHNUM: usize = 0x38;

// ELF64 program header field offsets
const P_OFFSET: usize = 0x08;
const P_PADDR: usize = 0x18;
const P_MEMSZ: usize = 0x28;

/// Smallest entry size that still contains every field we decode.
const PHDR_MIN_SIZE: usize = P_MEMSZ + 8;

/// One program-header entry from the kcore descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Physical address of the extent
    pub paddr: u64,
    /// Offset of the extent within the kcore file representation
    pub offset: u64,
    /// Extent size in bytes (`p_memsz`)
    pub size: u64,
}

/// Read the program-header table out of the kcore descriptor.
///
/// kcore has no conventional size or EOF, so the header and the table are
/// fetched with positioned reads rather than streaming. A short read of
/// either is an error.
pub fn read_segments<R: Read + Seek>(device: &mut KcoreDevice<R>) -> Result<Vec<Segment>> {
    let mut ehdr = [0u8; EHDR_SIZE];
    device.read_exact_at(0, &mut ehdr)?;

    if ehdr[..4] != ELF_MAGIC {
        return Err(Error::InvalidElfMagic([ehdr[0], ehdr[1], ehdr[2], ehdr[3]]));
    }
    if ehdr[4] != ELF_CLASS_64 {
        return Err(Error::NotElf64(ehdr[4]));
    }

    let phoff = LE::read_u64(&ehdr[E_PHOFF..E_PHOFF + 8]);
    let phentsize = LE::read_u16(&ehdr[E_PHENTSIZE..E_PHENTSIZE + 2]) as usize;
    let phnum = LE::read_u16(&ehdr[E_PHNUM..E_PHNUM + 2]) as usize;

    if phentsize < PHDR_MIN_SIZE {
        return Err(Error::BadPhdrEntSize(phentsize));
    }

    let mut table = vec![0u8; phnum * phentsize];
    device.read_exact_at(phoff, &mut table)?;

    let segments = table
        .chunks_exact(phentsize)
        .map(|entry| Segment {
            paddr: LE::read_u64(&entry[P_PADDR..P_PADDR + 8]),
            offset: LE::read_u64(&entry[P_OFFSET..P_OFFSET + 8]),
            size: LE::read_u64(&entry[P_MEMSZ..P_MEMSZ + 8]),
        })
        .collect();

    Ok(segments)
}
