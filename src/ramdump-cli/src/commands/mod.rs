//! Command handlers
//!
//! Both commands share the same discovery phase: check privileges, parse
//! the RAM ranges out of /proc/iomem, read the kcore segment table, and
//! join the two into the section list.

pub mod dump;
pub mod scan;

use std::fs::File;
use std::io::BufReader;

use anyhow::{bail, Context, Result};
use log::debug;
use nix::unistd::Uid;

use ramdump::{
    match_sections, parse_ram_ranges, read_segments, KcoreDevice, Section, IOMEM_PATH, KCORE_PATH,
};

/// Run the discovery phase and hand back the device plus the sections to
/// operate on.
pub fn open_sections() -> Result<(KcoreDevice<File>, Vec<Section>)> {
    if !Uid::effective().is_root() {
        bail!("root privileges are required to read {}", KCORE_PATH);
    }

    let iomem = File::open(IOMEM_PATH).with_context(|| format!("could not open {}", IOMEM_PATH))?;
    let ranges = parse_ram_ranges(BufReader::new(iomem))
        .with_context(|| format!("failed to parse {}", IOMEM_PATH))?;
    debug!("found {} System RAM ranges", ranges.len());

    let kcore = File::open(KCORE_PATH).with_context(|| format!("could not open {}", KCORE_PATH))?;
    let mut device = KcoreDevice::new(kcore);

    let segments = read_segments(&mut device)
        .with_context(|| format!("failed to read the {} descriptor", KCORE_PATH))?;
    debug!("kcore describes {} segments", segments.len());

    let sections = match_sections(&segments, &ranges)
        .context("failed to associate RAM ranges with kcore segments")?;
    if sections.is_empty() {
        bail!("no RAM range matched a kcore segment; nothing to acquire");
    }
    debug!("matched {} sections", sections.len());

    Ok((device, sections))
}
