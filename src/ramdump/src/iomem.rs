//! `/proc/iomem` parsing
//!
//! Extracts the physical address ranges the kernel labels `System RAM`.
//! Everything else in iomem (device windows, reserved regions, ACPI tables)
//! is ignored: only general-purpose memory is safe to acquire.

use std::io::BufRead;

use crate::{Error, Result};

/// Path to the resource-map pseudo-file.
pub const IOMEM_PATH: &str = "/proc/iomem";

/// Label iomem puts on general-purpose physical memory.
pub const SYSTEM_RAM_LABEL: &str = "System RAM";

/// Maximum number of RAM ranges a single machine is expected to report.
pub const MAX_RANGES: usize = 32;

/// One physical address range captured from iomem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddrRange {
    /// Sequence index of the top-level iomem entry this range belongs to.
    /// Indented sub-entries share their parent's index.
    pub index: usize,
    /// First physical byte of the range (inclusive)
    pub start: u64,
    /// Last physical byte of the range (inclusive)
    pub end: u64,
}

/// Parse iomem-format text and capture every System RAM range.
///
/// Lines look like `100000000-463fffffff : System RAM`; a leading space
/// marks a sub-entry of the previous top-level line. A captured line that
/// fails to parse, or a count past [`MAX_RANGES`], fails the whole parse —
/// a partial catalog would silently shrink the acquired image's coverage.
pub fn parse_ram_ranges<R: BufRead>(reader: R) -> Result<Vec<AddrRange>> {
    let mut ranges = Vec::new();
    let mut index = 0usize;
    let mut seen_top_level = false;

    for line in reader.lines() {
        let line = line?;

        if !line.starts_with(' ') {
            if seen_top_level {
                index += 1;
            }
            seen_top_level = true;
        }

        if !line.contains(SYSTEM_RAM_LABEL) {
            continue;
        }

        if ranges.len() == MAX_RANGES {
            return Err(Error::TooManyRanges { limit: MAX_RANGES });
        }

        let (start, end) = parse_bounds(&line)?;
        ranges.push(AddrRange { index, start, end });
    }

    Ok(ranges)
}

/// Parse the `<start>-<end>` hex field at the front of an iomem line.
fn parse_bounds(line: &str) -> Result<(u64, u64)> {
    let malformed = || Error::MalformedRange(line.trim_end().to_string());

    let field = line.split_whitespace().next().ok_or_else(malformed)?;
    let (start, end) = field.split_once('-').ok_or_else(malformed)?;

    let start = u64::from_str_radix(start, 16).map_err(|_| malformed())?;
    let end = u64::from_str_radix(end, 16).map_err(|_| malformed())?;

    Ok((start, end))
}
