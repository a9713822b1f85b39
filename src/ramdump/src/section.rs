//! Section matching
//!
//! Joins the RAM ranges reported by iomem against the segments described
//! by the kcore program-header table. The intersection is the authoritative
//! list of extents that are safe to copy or scan.

use crate::iomem::AddrRange;
use crate::kcore::Segment;
use crate::{Error, Result};

/// Maximum number of sections a dump or scan will operate on.
pub const MAX_SECTIONS: usize = 32;

/// A matched extent of physical RAM: the unit of work for dump and scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Physical address of the first byte
    pub physical_base: u64,
    /// Offset of the extent within the kcore file representation
    pub file_offset: u64,
    /// Extent size in bytes; always non-zero
    pub size: u64,
}

impl Section {
    /// Last physical address covered by this section (inclusive).
    pub fn end_addr(&self) -> u64 {
        self.physical_base + self.size - 1
    }
}

/// Associate RAM ranges with kcore segments.
///
/// A section is produced only when a range starts exactly at a segment's
/// physical address. Overlap without an aligned start means iomem and the
/// kernel's descriptor disagree about the extent, and such memory is not
/// trusted. Sections come out in segment order, then range order; zero-size
/// segments are skipped so every section has at least one byte.
pub fn match_sections(segments: &[Segment], ranges: &[AddrRange]) -> Result<Vec<Section>> {
    let mut sections = Vec::new();

    for segment in segments {
        if segment.size == 0 {
            continue;
        }

        for range in ranges {
            if segment.paddr != range.start {
                continue;
            }

            if sections.len() == MAX_SECTIONS {
                return Err(Error::TooManySections {
                    limit: MAX_SECTIONS,
                });
            }

            sections.push(Section {
                physical_base: range.start,
                file_offset: segment.offset,
                size: segment.size,
            });
        }
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(index: usize, start: u64, end: u64) -> AddrRange {
        AddrRange { index, start, end }
    }

    fn segment(paddr: u64, offset: u64, size: u64) -> Segment {
        Segment {
            paddr,
            offset,
            size,
        }
    }

    #[test]
    fn test_exact_start_match() {
        let segments = [segment(0x1000, 0, 0x2000), segment(0x5000, 0x2000, 0x1000)];
        let ranges = [range(0, 0x1000, 0x2fff)];

        let sections = match_sections(&segments, &ranges).unwrap();
        assert_eq!(
            sections,
            vec![Section {
                physical_base: 0x1000,
                file_offset: 0,
                size: 0x2000
            }]
        );
    }

    #[test]
    fn test_partial_overlap_not_matched() {
        // Range overlaps the segment but does not start at its paddr
        let segments = [segment(0x1000, 0, 0x2000)];
        let ranges = [range(0, 0x1800, 0x2fff)];

        let sections = match_sections(&segments, &ranges).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_segment_order_wins() {
        let segments = [segment(0x5000, 0x2000, 0x1000), segment(0x1000, 0, 0x2000)];
        let ranges = [range(0, 0x1000, 0x2fff), range(1, 0x5000, 0x5fff)];

        let sections = match_sections(&segments, &ranges).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].physical_base, 0x5000);
        assert_eq!(sections[1].physical_base, 0x1000);
    }

    #[test]
    fn test_zero_size_segment_skipped() {
        let segments = [segment(0x1000, 0, 0)];
        let ranges = [range(0, 0x1000, 0x1fff)];

        let sections = match_sections(&segments, &ranges).unwrap();
        assert!(sections.is_empty());
    }

    #[test]
    fn test_end_addr() {
        let section = Section {
            physical_base: 0x1000,
            file_offset: 0,
            size: 0x2000,
        };
        assert_eq!(section.end_addr(), 0x2fff);
    }

    #[test]
    fn test_capacity_enforced_at_insertion() {
        // One segment matched by more ranges than the section limit
        let segments = [segment(0x1000, 0, 0x1000)];
        let ranges: Vec<AddrRange> = (0..MAX_SECTIONS + 1)
            .map(|i| range(i, 0x1000, 0x1fff))
            .collect();

        let err = match_sections(&segments, &ranges).unwrap_err();
        match err {
            Error::TooManySections { limit } => assert_eq!(limit, MAX_SECTIONS),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
