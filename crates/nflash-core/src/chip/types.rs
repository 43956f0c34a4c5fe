//! Flash chip type definitions

use core::fmt;

use crate::error::LayoutError;

/// Maximum number of identification bytes a part may report
pub const MAX_ID_LEN: usize = 4;

/// Size of a 32KB erase block
pub const BLOCK32_SIZE: u32 = 32 * 1024;

/// Size of a 64KB erase block
pub const BLOCK64_SIZE: u32 = 64 * 1024;

/// Immutable facts about one flash part
///
/// Built once from a per-chip `const` (see [`crate::chip::parts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDescriptor {
    /// Total flash size in bytes
    pub volume: u32,
    /// Page size in bytes (largest single program)
    pub page_size: u32,
    /// Sector size in bytes (smallest erase)
    pub sector_size: u32,
    /// 32KB block erase size in bytes
    pub block32_size: u32,
    /// 64KB block erase size in bytes
    pub block64_size: u32,
    /// Send opcode, address and data in one bus write when the caller
    /// provides a framed buffer
    pub fast_write: bool,
    /// Number of identification bytes returned by read-id
    pub id_length: u16,
    /// Delay between status polls after a page program, in microseconds
    pub page_write_timeout_us: u16,
    /// Delay between status polls after a sector erase, in milliseconds
    pub sector_erase_timeout_ms: u16,
    /// Delay between status polls after a 32KB block erase, in milliseconds
    pub block32_erase_timeout_ms: u16,
    /// Delay between status polls after a 64KB block erase, in milliseconds
    pub block64_erase_timeout_ms: u16,
    /// Delay between status polls after a chip erase, in milliseconds
    pub chip_erase_timeout_ms: u16,
}

impl ChipDescriptor {
    /// Copy of this descriptor with fast write switched on or off
    pub const fn with_fast_write(mut self, enabled: bool) -> Self {
        self.fast_write = enabled;
        self
    }

    /// Check the geometry invariants
    ///
    /// Page size must divide the sector size, the sector must fit in the
    /// chip, block sizes must be whole sectors and the id must fit in
    /// [`MAX_ID_LEN`] bytes.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let ok = self.page_size > 0
            && self.sector_size > 0
            && self.sector_size.is_multiple_of(self.page_size)
            && self.sector_size <= self.volume
            && self.block32_size > 0
            && self.block64_size > 0
            && self.block32_size.is_multiple_of(self.sector_size)
            && self.block64_size.is_multiple_of(self.sector_size)
            && self.id_length as usize <= MAX_ID_LEN;

        if ok {
            Ok(())
        } else {
            Err(LayoutError::InvalidGeometry)
        }
    }

    /// Check if an address is inside the chip
    pub fn is_valid_address(&self, addr: u32) -> bool {
        addr < self.volume
    }

    /// Bytes from `addr` to the end of its page
    pub fn page_remaining(&self, addr: u32) -> u32 {
        self.page_size - addr % self.page_size
    }

    /// Check if `addr` starts a sector
    pub fn is_sector_start(&self, addr: u32) -> bool {
        addr.is_multiple_of(self.sector_size)
    }

    /// Poll interval for the given erase class, in microseconds
    pub fn erase_poll_interval_us(&self, kind: EraseKind) -> u32 {
        let ms = match kind {
            EraseKind::Sector => self.sector_erase_timeout_ms,
            EraseKind::Block32 => self.block32_erase_timeout_ms,
            EraseKind::Block64 => self.block64_erase_timeout_ms,
            EraseKind::Chip => self.chip_erase_timeout_ms,
        };
        ms as u32 * 1000
    }

    /// Erase size of the given class in bytes
    pub fn erase_size(&self, kind: EraseKind) -> u32 {
        match kind {
            EraseKind::Sector => self.sector_size,
            EraseKind::Block32 => self.block32_size,
            EraseKind::Block64 => self.block64_size,
            EraseKind::Chip => self.volume,
        }
    }
}

/// Erase granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EraseKind {
    /// 4KB sector
    Sector,
    /// 32KB block
    Block32,
    /// 64KB block
    Block64,
    /// Whole chip
    Chip,
}

impl fmt::Display for EraseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sector => write!(f, "sector"),
            Self::Block32 => write!(f, "32K block"),
            Self::Block64 => write!(f, "64K block"),
            Self::Chip => write!(f, "chip"),
        }
    }
}

/// Identification bytes read from the chip
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ChipId(pub heapless::Vec<u8, MAX_ID_LEN>);

impl ChipId {
    /// The received bytes, in order
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// JEDEC manufacturer byte, if any byte was read
    pub fn manufacturer(&self) -> Option<u8> {
        self.0.first().copied()
    }
}

impl fmt::Debug for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChipId({})", self)
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}
