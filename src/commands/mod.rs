//! CLI command implementations
//!
//! Every command runs against a [`FlashDriver`](nflash_core::flash::FlashDriver)
//! over the emulated chip, so the same code paths as on hardware are
//! exercised: window commands go through a memory layer, `info` and
//! `chip-erase` talk to the driver directly.

mod info;
pub mod window;
mod windows;

pub use info::cmd_info;
pub use windows::cmd_windows;

/// Format a byte count with a binary unit
pub fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

/// Hex dump with addresses, 16 bytes per line
pub fn hexdump(base: u32, data: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in data.chunks(16).enumerate() {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{:08x}  {:<47}  |{}|\n",
            base as usize + i * 16,
            hex.join(" "),
            ascii
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(4 * 1024 * 1024), "4 MiB");
        assert_eq!(format_size(0x1_8000), "96 KiB");
        assert_eq!(format_size(100), "100 B");
        assert_eq!(format_size(1536 * 1024 + 1), "1572865 B");
    }

    #[test]
    fn test_hexdump() {
        let dump = hexdump(0x10, b"AB\x00");
        assert_eq!(dump, format!("00000010  {:<47}  |AB.|\n", "41 42 00"));
        assert_eq!(hexdump(0, &[0u8; 17]).lines().count(), 2);
    }
}
