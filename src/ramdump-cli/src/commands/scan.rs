//! In-place pattern search

use std::io::{self, Write};

use anyhow::{Context, Result};

use ramdump::{render_match, scan_section, HighlightStyle};

use crate::colors::{CLEAR, CYAN, GREEN, RED, YELLOW};

/// Handle the scan command: search every matched section for `pattern`,
/// printing each hit as a hex/ASCII dump and the total afterwards.
pub fn handle(pattern: &str, context_bytes: usize) -> Result<()> {
    let (mut device, sections) = super::open_sections()?;

    let style = HighlightStyle {
        begin: RED,
        end: CLEAR,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut total = 0u64;
    for (i, section) in sections.iter().enumerate() {
        println!(
            "{}Scanning section {} (0x{:x} - 0x{:x}) for {}{}",
            CYAN,
            i,
            section.physical_base,
            section.end_addr(),
            pattern,
            CLEAR
        );

        // render_match writes to stdout inside the scan callback; stash the
        // first write error and surface it after the section finishes.
        let mut render_err: Option<io::Error> = None;
        total += scan_section(
            &mut device,
            section,
            pattern.as_bytes(),
            context_bytes,
            &mut |hit| {
                if render_err.is_none() {
                    render_err = render_match(&mut out, hit, &style).err();
                }
            },
        )
        .with_context(|| format!("failed to scan section {}", i))?;

        if let Some(err) = render_err {
            return Err(err).context("failed to write match output");
        }
    }

    out.flush().context("failed to flush match output")?;

    if total == 0 {
        println!("{}No matches found for {}{}", GREEN, pattern, CLEAR);
    } else {
        println!(
            "{}Found {} total matches for {}{}",
            YELLOW, total, pattern, CLEAR
        );
    }
    Ok(())
}
