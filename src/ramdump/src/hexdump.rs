//! Hex and ASCII rendering of scan matches
//!
//! Pure formatting: a match window becomes a header line, then
//! 16-bytes-per-row hex with the pattern bytes wrapped in caller-supplied
//! highlight markers, then the ASCII column with `.` standing in for
//! non-printable bytes. The library writes no color itself; callers that
//! want ANSI highlighting pass the escape sequences as the style.

use std::io::{self, Write};

use crate::scan::ScanMatch;

/// Placeholder shown for bytes with no printable representation.
pub const UNPRINTABLE_ASCII: char = '.';

const BYTES_PER_ROW: usize = 16;
const HEADER_DELIM_NUM: usize = 83;
const HEX_HEADER_PADDING: usize = 37;

/// Marker strings wrapped around the pattern bytes of a match.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightStyle<'a> {
    pub begin: &'a str,
    pub end: &'a str,
}

/// Printable representation of a byte: the character itself for printable
/// ASCII, otherwise [`UNPRINTABLE_ASCII`].
pub fn ascii_representation(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        UNPRINTABLE_ASCII
    }
}

/// Render one match as a columnar hex + ASCII dump.
pub fn render_match<W: Write>(
    out: &mut W,
    hit: &ScanMatch,
    style: &HighlightStyle,
) -> io::Result<()> {
    render_header(out, hit.match_offset())?;

    let pattern_range = hit.match_pos..hit.match_pos + hit.pattern_len;

    for (row, chunk) in hit.window.chunks(BYTES_PER_ROW).enumerate() {
        let row_base = row * BYTES_PER_ROW;
        write!(out, "0x{:08x} | ", hit.offset + row_base as u64)?;

        for col in 0..BYTES_PER_ROW {
            match chunk.get(col) {
                Some(&byte) if pattern_range.contains(&(row_base + col)) => {
                    write!(out, "{}{:02x}{} ", style.begin, byte, style.end)?;
                }
                Some(&byte) => write!(out, "{:02x} ", byte)?,
                None => write!(out, "   ")?,
            }
        }

        write!(out, "| ")?;

        for (col, &byte) in chunk.iter().enumerate() {
            let ch = ascii_representation(byte);
            if pattern_range.contains(&(row_base + col)) {
                write!(out, "{}{}{}", style.begin, ch, style.end)?;
            } else {
                write!(out, "{}", ch)?;
            }
        }

        writeln!(out)?;
    }

    writeln!(out)
}

fn render_header<W: Write>(out: &mut W, match_offset: u64) -> io::Result<()> {
    writeln!(out, "\nMatch at offset 0x{:x}", match_offset)?;
    writeln!(
        out,
        "     Offset    | Hexadecimal{}| ASCII",
        " ".repeat(HEX_HEADER_PADDING)
    )?;
    writeln!(out, "{}", "-".repeat(HEADER_DELIM_NUM))
}
