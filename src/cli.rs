//! CLI argument parsing

use clap::{Parser, Subcommand};
use nflash_core::layer::{parse_number, parse_size};
use std::path::PathBuf;

/// Parse a string of hex digit pairs like "00ff12" or "00 ff 12"
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    if !digits.is_ascii() || digits.is_empty() || digits.len() % 2 != 0 {
        return Err(format!("Expected an even number of hex digits: {}", s));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex byte: {}", e))
        })
        .collect()
}

#[derive(Parser)]
#[command(name = "nflash")]
#[command(author, version, about = "SPI-NOR flash window tool (emulated chip)", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Flash image backing the emulated chip (created erased if missing)
    #[arg(long, global = true, default_value = "flash.bin")]
    pub image: PathBuf,

    /// Chip model (defaults to the window table's chip, then MX25L3233F)
    #[arg(long, global = true)]
    pub chip: Option<String>,

    /// Window table (TOML format)
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,

    /// Send opcode, address and data of each page program in one transfer
    #[arg(long, global = true)]
    pub fast_write: bool,

    /// Give up after this many status polls per command (0 = never)
    #[arg(long, global = true)]
    pub max_polls: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Window selection shared by window-relative commands
#[derive(clap::Args, Debug, Clone)]
pub struct WindowArgs {
    /// Window name from the window table
    #[arg(short, long)]
    pub window: String,

    /// Offset inside the window (hex or decimal)
    #[arg(long, value_parser = parse_number, default_value = "0")]
    pub offset: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show chip information and registers
    Info,

    /// List the windows of the window table
    Windows,

    /// Read bytes from a window
    Read {
        #[command(flatten)]
        target: WindowArgs,

        /// Number of bytes (e.g., 256, 0x100, "4 KiB")
        #[arg(short, long, value_parser = parse_size)]
        length: u32,

        /// Output file (hex dump to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a file into a window, erasing sectors as they are reached
    Write {
        #[command(flatten)]
        target: WindowArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Program bytes in place without erasing (only clears bits)
    Change {
        #[command(flatten)]
        target: WindowArgs,

        /// Bytes to program, as hex (e.g., "00ff12")
        // Full path keeps clap from treating this as a repeated argument
        #[arg(short, long, value_parser = parse_hex_bytes)]
        data: ::std::vec::Vec<u8>,
    },

    /// Erase a whole window
    Erase {
        /// Window name from the window table
        #[arg(short, long)]
        window: String,
    },

    /// Erase the whole chip
    ChipErase,
}

impl Commands {
    /// Check if the command changes the flash contents
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Commands::Write { .. }
                | Commands::Change { .. }
                | Commands::Erase { .. }
                | Commands::ChipErase
        )
    }
}
