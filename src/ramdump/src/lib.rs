//! Linux physical memory acquisition and search
//!
//! Acquires a forensic image of a running machine's physical RAM through
//! the kernel's `/proc/kcore` pseudo-file, or searches that memory in place
//! for a literal byte pattern.
//!
//! # Format overview
//!
//! ## `/proc/iomem` (resource map)
//!
//! Line-oriented text, one resource per line:
//!
//! ```text
//! 00001000-0009ffff : System RAM
//!   00002000-00002fff : Kernel data
//! ```
//!
//! A leading space marks a sub-entry of the previous top-level line. Only
//! lines labeled `System RAM` describe general-purpose physical memory.
//!
//! ## `/proc/kcore` (memory descriptor)
//!
//! ELF64-shaped: a standard ELF header at offset 0 points at a
//! program-header table whose entries map physical extents (`p_paddr`,
//! `p_memsz`) to offsets within the kcore file representation (`p_offset`).
//!
//! ## LiME dump container
//!
//! One packed little-endian header per memory range, followed by the raw
//! bytes of the range, concatenated with no delimiters:
//!
//! ```text
//! magic(u32) | version(u32) | s_addr(u64) | e_addr(u64) | reserved(8 bytes)
//! ```
//!
//! The library operates on already-open handles. Opening the pseudo-files,
//! privilege checks, argument parsing and status output belong to the
//! caller.

pub mod device;
pub mod hexdump;
pub mod iomem;
pub mod kcore;
pub mod lime;
pub mod scan;
pub mod section;

pub use device::KcoreDevice;
pub use hexdump::{ascii_representation, render_match, HighlightStyle, UNPRINTABLE_ASCII};
pub use iomem::{parse_ram_ranges, AddrRange, IOMEM_PATH, MAX_RANGES, SYSTEM_RAM_LABEL};
pub use kcore::{read_segments, Segment, KCORE_PATH};
pub use lime::{write_dump, write_section, RangeHeader, CHUNK_SIZE, LIME_MAGIC, LIME_VERSION};
pub use scan::{scan_section, scan_sections, ScanMatch};
pub use section::{match_sections, Section, MAX_SECTIONS};

/// Errors from memory acquisition and search
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read: need {needed} bytes, got {actual}")]
    ShortRead { needed: usize, actual: usize },

    #[error("Invalid ELF magic in memory descriptor: {0:02x?}")]
    InvalidElfMagic([u8; 4]),

    #[error("Memory descriptor is not 64-bit ELF (class {0})")]
    NotElf64(u8),

    #[error("Program header entry size {0} too small to decode")]
    BadPhdrEntSize(usize),

    #[error("Malformed iomem range line: {0:?}")]
    MalformedRange(String),

    #[error("Too many physical memory ranges (limit {limit})")]
    TooManyRanges { limit: usize },

    #[error("Too many matched sections (limit {limit})")]
    TooManySections { limit: usize },

    #[error("Search pattern is empty")]
    EmptyPattern,
}

pub type Result<T> = std::result::Result<T, Error>;
