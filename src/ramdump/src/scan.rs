//! Pattern scanning across matched sections
//!
//! Slides a fixed-length window with symmetric context over each section's
//! byte range, reporting every occurrence of a literal pattern. Candidates
//! advance one byte at a time, so overlapping occurrences are all reported.
//!
//! Sections are streamed through fixed-size blocks rather than re-read from
//! the device per candidate byte: each block buffers one stretch of
//! candidate positions plus enough slack on both sides that every display
//! window is already in memory. The block search itself uses
//! `memmem::Finder` with an overlapping advance.

use std::io::{Read, Seek};

use memchr::memmem;

use crate::device::KcoreDevice;
use crate::section::Section;
use crate::{Error, Result};

/// Candidate positions buffered per block (1 MiB).
const BLOCK_SIZE: u64 = 0x10_0000;

/// One pattern hit, with its display window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMatch {
    /// Absolute kcore offset of the first window byte
    pub offset: u64,
    /// Window bytes: prefix context, then pattern, then suffix context
    pub window: Vec<u8>,
    /// Offset of the pattern within the window (equals the prefix length)
    pub match_pos: usize,
    /// Length of the matched pattern
    pub pattern_len: usize,
}

impl ScanMatch {
    /// Absolute kcore offset of the match itself.
    pub fn match_offset(&self) -> u64 {
        self.offset + self.match_pos as u64
    }

    /// Context bytes captured after the pattern.
    pub fn suffix_len(&self) -> usize {
        self.window.len() - self.match_pos - self.pattern_len
    }
}

/// Scan one section for `pattern`, calling `sink` for every hit.
///
/// `context` is the number of bytes captured on each side of a match,
/// clipped where the window would cross the section boundary. With
/// `context == 0` the window is exactly the pattern bytes. Returns the
/// number of matches in the section; a section smaller than the pattern
/// holds none.
pub fn scan_section<R, F>(
    device: &mut KcoreDevice<R>,
    section: &Section,
    pattern: &[u8],
    context: usize,
    sink: &mut F,
) -> Result<u64>
where
    R: Read + Seek,
    F: FnMut(&ScanMatch),
{
    scan_section_blocks(device, section, pattern, context, BLOCK_SIZE, sink)
}

/// Scan every section in order, returning the total match count.
///
/// Zero matches is a successful outcome, distinct from a scan error.
pub fn scan_sections<R, F>(
    device: &mut KcoreDevice<R>,
    sections: &[Section],
    pattern: &[u8],
    context: usize,
    sink: &mut F,
) -> Result<u64>
where
    R: Read + Seek,
    F: FnMut(&ScanMatch),
{
    let mut total = 0u64;
    for section in sections {
        total += scan_section(device, section, pattern, context, sink)?;
    }
    Ok(total)
}

fn scan_section_blocks<R, F>(
    device: &mut KcoreDevice<R>,
    section: &Section,
    pattern: &[u8],
    context: usize,
    block_size: u64,
    sink: &mut F,
) -> Result<u64>
where
    R: Read + Seek,
    F: FnMut(&ScanMatch),
{
    if pattern.is_empty() {
        return Err(Error::EmptyPattern);
    }

    let pattern_len = pattern.len() as u64;
    if section.size < pattern_len {
        return Ok(0);
    }

    let section_start = section.file_offset;
    let section_end = section.file_offset + section.size;
    let last_candidate = section_end - pattern_len;

    let finder = memmem::Finder::new(pattern);
    let mut matches = 0u64;

    let mut block_start = section_start;
    loop {
        // Last candidate position covered by this block (inclusive)
        let block_end = (block_start + block_size - 1).min(last_candidate);

        // Buffer the candidates plus window slack on both sides, clipped to
        // the section. Every window for a candidate in the block fits here.
        let buf_start = block_start.saturating_sub(context as u64).max(section_start);
        let buf_end = (block_end + pattern_len + context as u64).min(section_end);
        let mut buffer = vec![0u8; (buf_end - buf_start) as usize];
        device.read_exact_at(buf_start, &mut buffer)?;

        // Slice holding the full pattern for every candidate in the block;
        // its final position is exactly the block's last candidate, so a
        // match is never counted by two blocks.
        let cand_off = (block_start - buf_start) as usize;
        let cand_len = (block_end - block_start + pattern_len) as usize;
        let search = &buffer[cand_off..cand_off + cand_len];

        let mut from = 0usize;
        while let Some(rel) = finder.find(&search[from..]) {
            let pos = from + rel;
            let p = block_start + pos as u64;

            let prefix = (context as u64).min(p - section_start) as usize;
            let suffix = (context as u64).min(section_end - (p + pattern_len)) as usize;

            let window_at = cand_off + pos - prefix;
            let window_len = prefix + pattern.len() + suffix;
            let hit = ScanMatch {
                offset: p - prefix as u64,
                window: buffer[window_at..window_at + window_len].to_vec(),
                match_pos: prefix,
                pattern_len: pattern.len(),
            };
            sink(&hit);
            matches += 1;

            // Unit stride: overlapping occurrences all count
            from = pos + 1;
        }

        if block_end == last_candidate {
            break;
        }
        block_start = block_end + 1;
    }

    Ok(matches)
}
