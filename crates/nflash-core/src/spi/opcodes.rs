//! SPI-NOR opcodes
//!
//! The standard JEDEC values are listed as constants; a chip model binds the
//! twelve commands the driver uses into an [`OpcodeTable`].

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status and configuration registers
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Read Configuration Register (Macronix)
pub const RDCR: u8 = 0x15;
/// Read Status Register 2 (Winbond)
pub const RDSR2: u8 = 0x35;
/// Write Status Register
pub const WRSR: u8 = 0x01;

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Read / program
// ============================================================================

/// Read Data
pub const READ: u8 = 0x03;
/// Page Program
pub const PP: u8 = 0x02;

// ============================================================================
// Erase
// ============================================================================

/// Sector Erase 4KB
pub const SE_20: u8 = 0x20;
/// Block Erase 32KB
pub const BE_52: u8 = 0x52;
/// Block Erase 64KB
pub const BE_D8: u8 = 0xD8;
/// Chip Erase
pub const CE_60: u8 = 0x60;
/// Chip Erase (alternate opcode)
pub const CE_C7: u8 = 0xC7;

/// Command bytes of one flash part
///
/// Immutable; one `const` instance per chip model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeTable {
    /// Read data
    pub read_data: u8,
    /// Write disable
    pub write_disable: u8,
    /// Write enable
    pub write_enable: u8,
    /// Read status register
    pub read_status: u8,
    /// Read configuration register
    pub read_config: u8,
    /// Write status register
    pub write_status: u8,
    /// 4KB sector erase
    pub sector_erase: u8,
    /// 32KB block erase
    pub block32_erase: u8,
    /// 64KB block erase
    pub block64_erase: u8,
    /// Whole-chip erase
    pub chip_erase: u8,
    /// Page program
    pub page_program: u8,
    /// Read identification
    pub read_id: u8,
}

impl OpcodeTable {
    /// The common JEDEC command set shared by most 25-series parts
    pub const JEDEC: Self = Self {
        read_data: READ,
        write_disable: WRDI,
        write_enable: WREN,
        read_status: RDSR,
        read_config: RDCR,
        write_status: WRSR,
        sector_erase: SE_20,
        block32_erase: BE_52,
        block64_erase: BE_D8,
        chip_erase: CE_60,
        page_program: PP,
        read_id: RDID,
    };
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::JEDEC
    }
}
