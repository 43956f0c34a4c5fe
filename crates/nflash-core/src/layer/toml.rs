//! TOML window table parsing
//!
//! Parses window tables in TOML format:
//!
//! ```toml
//! [chip]
//! model = "MX25L3233F"
//!
//! [[window]]
//! name = "settings"
//! start = 0x000000
//! size = "64 KiB"
//!
//! [[window]]
//! name = "log"
//! start = 0x010000
//! size = 0x20000
//! ```

use std::format;
use std::fs;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use super::{Window, WindowTable};
use crate::error::LayoutError;

/// TOML window table file structure
#[derive(Debug, serde::Deserialize)]
struct TomlWindowFile {
    chip: Option<TomlChip>,
    #[serde(default)]
    window: Vec<TomlWindow>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlChip {
    model: String,
}

/// Window definition in TOML
#[derive(Debug, serde::Deserialize)]
struct TomlWindow {
    name: String,
    #[serde(deserialize_with = "deserialize_number")]
    start: u32,
    #[serde(deserialize_with = "deserialize_size")]
    size: u32,
}

/// Integer literal or string, as written in the file
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum IntOrStr {
    Int(u32),
    Str(String),
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match IntOrStr::deserialize(deserializer)? {
        IntOrStr::Int(n) => Ok(n),
        IntOrStr::Str(s) => parse_number(&s).map_err(serde::de::Error::custom),
    }
}

/// Deserialize a size that can carry a B / KiB / MiB suffix
fn deserialize_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match IntOrStr::deserialize(deserializer)? {
        IntOrStr::Int(n) => Ok(n),
        IntOrStr::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

/// Parse a size string like "64 KiB", "4096" or "0x1000"
pub fn parse_size(s: &str) -> Result<u32, String> {
    if let Ok(n) = parse_number(s) {
        return Ok(n);
    }

    let lower = s.trim().to_lowercase();
    let (num, multiplier) = if let Some(n) = lower.strip_suffix("mib") {
        (n, 1024 * 1024)
    } else if let Some(n) = lower.strip_suffix("kib") {
        (n, 1024)
    } else if let Some(n) = lower.strip_suffix('b') {
        (n, 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u32 = num
        .trim()
        .parse()
        .map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size too large: {}", s))
}

impl WindowTable {
    /// Load a window table from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let content = fs::read_to_string(path).map_err(|_| LayoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse a window table from a TOML string
    ///
    /// Windows are sorted by start address. The result is not validated
    /// against any chip; call [`WindowTable::validate`] for that.
    pub fn from_toml_str(content: &str) -> Result<Self, LayoutError> {
        let file: TomlWindowFile = toml::from_str(content).map_err(|e| {
            log::debug!("window table: {}", e);
            LayoutError::ParseError
        })?;

        let mut table = WindowTable {
            chip: file.chip.map(|c| c.model),
            windows: Vec::new(),
        };
        for w in file.window {
            table.add(Window::new(w.name, w.start, w.size));
        }
        table.sort_by_address();
        Ok(table)
    }
}
