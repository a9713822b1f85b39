//! CLI argument definitions
//!
//! All clap-derived structs and enums for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Dump or search the physical RAM of a running Linux machine via /proc/kcore
#[derive(Parser)]
#[command(name = "ramdump", version, about)]
pub struct Cli {
    /// Print extra detail while running
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Acquire a LiME-format image of physical RAM
    Dump {
        /// Path of the image file to create
        output: PathBuf,
    },

    /// Search physical RAM for a byte pattern
    Scan {
        /// Literal pattern to search for
        pattern: String,

        /// Bytes of surrounding context to display around each match
        context_bytes: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dump() {
        let cli = Cli::parse_from(["ramdump", "dump", "/tmp/ram.lime"]);
        match cli.command {
            Commands::Dump { output } => {
                assert_eq!(output, PathBuf::from("/tmp/ram.lime"));
            }
            _ => panic!("expected dump command"),
        }
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from(["ramdump", "scan", "password=", "16"]);
        match cli.command {
            Commands::Scan {
                pattern,
                context_bytes,
            } => {
                assert_eq!(pattern, "password=");
                assert_eq!(context_bytes, 16);
            }
            _ => panic!("expected scan command"),
        }
    }
}
