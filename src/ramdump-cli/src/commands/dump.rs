//! Physical memory image acquisition

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use ramdump::lime;

use crate::colors::{CLEAR, CYAN, GREEN};

/// Handle the dump command: write every matched section to `output` as a
/// LiME image.
///
/// A failed dump leaves the partial output file in place for inspection;
/// nothing is rolled back.
pub fn handle(output: &Path) -> Result<()> {
    let (mut device, sections) = super::open_sections()?;

    let file = File::create(output)
        .with_context(|| format!("could not create {}", output.display()))?;
    let mut out = BufWriter::new(file);

    let mut total = 0u64;
    for (i, section) in sections.iter().enumerate() {
        println!(
            "{}Copying section {} (0x{:x} - 0x{:x}){}",
            CYAN,
            i,
            section.physical_base,
            section.end_addr(),
            CLEAR
        );

        total += lime::write_section(&mut device, &mut out, section)
            .with_context(|| format!("failed while writing section {}", i))?;
    }

    out.flush().context("failed to flush the output file")?;
    debug!("wrote {} bytes total", total);

    println!(
        "{}Successfully dumped memory to {}{}",
        GREEN,
        output.display(),
        CLEAR
    );
    Ok(())
}
