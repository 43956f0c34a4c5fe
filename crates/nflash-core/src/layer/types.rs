//! Window descriptor

use crate::chip::{ChipDescriptor, EraseKind};
use crate::error::LayoutError;

/// A window of the chip: physical start address and size in bytes
///
/// Both must be multiples of the chip's sector size, the window must not
/// be empty and it must end inside the chip. The descriptor is checked when
/// a [`MemoryLayer`](super::MemoryLayer) is opened over it; it is never
/// aligned automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerDescriptor {
    /// Physical address of virtual offset 0
    pub start: u32,
    /// Window size in bytes
    pub volume: u32,
}

impl LayerDescriptor {
    /// Create a new descriptor
    pub const fn new(start: u32, volume: u32) -> Self {
        Self { start, volume }
    }

    /// Physical end address (exclusive)
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.volume)
    }

    /// Check if a virtual address is inside the window
    pub fn contains(&self, vaddr: u32) -> bool {
        vaddr < self.volume
    }

    /// Physical address of a virtual offset
    pub fn physical(&self, vaddr: u32) -> u32 {
        self.start + vaddr
    }

    /// Check if two windows share at least one byte
    pub fn overlaps(&self, other: &LayerDescriptor) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Largest erase the window start is aligned to that fits in `remaining`
    pub fn erase_kind(&self, chip: &ChipDescriptor, remaining: u32) -> EraseKind {
        if self.start.is_multiple_of(chip.block64_size) && remaining >= chip.block64_size {
            EraseKind::Block64
        } else if self.start.is_multiple_of(chip.block32_size) && remaining >= chip.block32_size {
            EraseKind::Block32
        } else {
            EraseKind::Sector
        }
    }

    /// Check the window against a chip's geometry
    pub fn validate(&self, chip: &ChipDescriptor) -> Result<(), LayoutError> {
        if self.volume == 0 {
            return Err(LayoutError::Empty);
        }
        for value in [self.start, self.volume] {
            if !value.is_multiple_of(chip.sector_size) {
                return Err(LayoutError::Unaligned {
                    value,
                    alignment: chip.sector_size,
                });
            }
        }
        match self.start.checked_add(self.volume) {
            Some(end) if end <= chip.volume => Ok(()),
            _ => Err(LayoutError::OutOfBounds),
        }
    }
}
