//! ANSI color codes for status output
//!
//! All user-facing coloring lives here in the CLI; the library renders
//! plain bytes and takes highlight markers from the caller.

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";
pub const CLEAR: &str = "\x1b[0m";
