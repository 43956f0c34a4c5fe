//! Catalogue of known flash parts
//!
//! Each entry pairs a [`ChipDescriptor`] with the [`OpcodeTable`] of the
//! part. The target part is chosen at build time by naming its constant,
//! or at runtime with [`find_part`].

use super::types::{ChipDescriptor, BLOCK32_SIZE, BLOCK64_SIZE};
use crate::spi::opcodes::{self, OpcodeTable};

/// A named chip descriptor / opcode table pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Part {
    /// Vendor name (e.g., "Macronix")
    pub vendor: &'static str,
    /// Chip model name (e.g., "MX25L3233F")
    pub name: &'static str,
    /// Bytes the part answers to read-id with
    pub id: &'static [u8],
    /// Geometry and timing
    pub chip: ChipDescriptor,
    /// Command bytes
    pub opcodes: OpcodeTable,
}

/// Macronix MX25L3233F, 32 Mbit
pub const MX25L3233F: Part = Part {
    vendor: "Macronix",
    name: "MX25L3233F",
    id: &[0xC2, 0x20, 0x16],
    chip: ChipDescriptor {
        volume: 0x40_0000,
        page_size: 256,
        sector_size: 4096,
        block32_size: BLOCK32_SIZE,
        block64_size: BLOCK64_SIZE,
        fast_write: false,
        id_length: 2,
        page_write_timeout_us: 60,
        sector_erase_timeout_ms: 5,
        block32_erase_timeout_ms: 100,
        block64_erase_timeout_ms: 200,
        chip_erase_timeout_ms: 500,
    },
    opcodes: OpcodeTable {
        read_data: opcodes::READ,
        write_disable: opcodes::WRDI,
        write_enable: opcodes::WREN,
        read_status: opcodes::RDSR,
        read_config: opcodes::RDCR,
        write_status: opcodes::WRSR,
        sector_erase: opcodes::SE_20,
        block32_erase: opcodes::BE_52,
        block64_erase: opcodes::BE_D8,
        chip_erase: opcodes::CE_60,
        page_program: opcodes::PP,
        read_id: opcodes::RDID,
    },
};

/// Winbond W25Q32JV, 32 Mbit
///
/// Winbond has no configuration register; status register 2 is read in
/// its place.
pub const W25Q32JV: Part = Part {
    vendor: "Winbond",
    name: "W25Q32JV",
    id: &[0xEF, 0x40, 0x16],
    chip: ChipDescriptor {
        volume: 0x40_0000,
        page_size: 256,
        sector_size: 4096,
        block32_size: BLOCK32_SIZE,
        block64_size: BLOCK64_SIZE,
        fast_write: false,
        id_length: 3,
        page_write_timeout_us: 400,
        sector_erase_timeout_ms: 45,
        block32_erase_timeout_ms: 120,
        block64_erase_timeout_ms: 150,
        chip_erase_timeout_ms: 1000,
    },
    opcodes: OpcodeTable {
        read_config: opcodes::RDSR2,
        chip_erase: opcodes::CE_C7,
        ..OpcodeTable::JEDEC
    },
};

/// All known parts
pub const PARTS: &[Part] = &[MX25L3233F, W25Q32JV];

/// Find a part by model name (case-insensitive)
pub fn find_part(name: &str) -> Option<&'static Part> {
    PARTS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
