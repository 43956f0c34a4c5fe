//! nflash-dummy - In-memory SPI-NOR chip emulator
//!
//! [`EmulatedChip`] implements [`Transport`] and decodes each chip-select
//! frame the way a real part would: it answers read-id, status, config
//! and data reads, and executes write enable/disable, status writes, page
//! programs and erases when chip select is released.
//!
//! Besides the flash contents it keeps an operation log of every program
//! and erase, and can inject transport failures, a busy bus, or a chip
//! that never finishes. It backs the `nflash` command line tool and the
//! end-to-end tests of the driver and memory layer.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
mod image;

#[cfg(feature = "std")]
pub use image::ImageError;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use nflash_core::chip::{ChipDescriptor, EraseKind, Part};
use nflash_core::spi::{OpcodeTable, Status, FRAME_HEADER_LEN};
use nflash_core::transport::{Transport, TransportError};

/// A program or erase the chip executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Page program of `len` bytes at `addr`
    Program {
        /// Start address as sent
        addr: u32,
        /// Number of data bytes
        len: usize,
    },
    /// Erase of the unit containing `addr`
    Erase {
        /// Erase granularity
        kind: EraseKind,
        /// Address as sent (0 for chip erase)
        addr: u32,
    },
    /// Status register write
    WriteStatus(u8),
}

/// In-memory SPI-NOR part
#[cfg(feature = "alloc")]
pub struct EmulatedChip {
    chip: ChipDescriptor,
    opcodes: OpcodeTable,
    id: Vec<u8>,
    data: Vec<u8>,
    /// Protection bits as last written; WIP and WEL are computed
    status: u8,
    config: u8,
    write_enabled: bool,
    busy_polls: u32,
    busy_remaining: u32,
    stuck_busy: bool,
    bus_busy: bool,
    fail_write_at: Option<usize>,
    fail_read_at: Option<usize>,
    writes: usize,
    reads: usize,
    selected: bool,
    frame: Vec<u8>,
    read_pos: usize,
    /// A transfer in the current frame failed; the command is dropped
    aborted: bool,
    operations: Vec<Operation>,
    elapsed_us: u64,
}

#[cfg(feature = "alloc")]
impl EmulatedChip {
    /// Create an erased chip with the given geometry and command set
    pub fn new(chip: &ChipDescriptor, opcodes: &OpcodeTable) -> Self {
        Self {
            chip: *chip,
            opcodes: *opcodes,
            id: Vec::new(),
            data: vec![0xFF; chip.volume as usize],
            status: 0,
            config: 0,
            write_enabled: false,
            busy_polls: 0,
            busy_remaining: 0,
            stuck_busy: false,
            bus_busy: false,
            fail_write_at: None,
            fail_read_at: None,
            writes: 0,
            reads: 0,
            selected: false,
            frame: Vec::new(),
            read_pos: 0,
            aborted: false,
            operations: Vec::new(),
            elapsed_us: 0,
        }
    }

    /// Create an erased chip emulating a catalogue part
    pub fn for_part(part: &Part) -> Self {
        Self::new(&part.chip, &part.opcodes).with_id(part.id)
    }

    /// Set the identification bytes
    pub fn with_id(mut self, id: &[u8]) -> Self {
        self.id = id.to_vec();
        self
    }

    /// Keep WIP set for `polls` status reads after each program or erase
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Get the flash contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable flash contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the emulated geometry
    pub fn chip(&self) -> &ChipDescriptor {
        &self.chip
    }

    /// Programs, erases and status writes executed so far
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Forget the operation log
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// (address, length) of every page program
    pub fn programs(&self) -> Vec<(u32, usize)> {
        self.operations
            .iter()
            .filter_map(|op| match *op {
                Operation::Program { addr, len } => Some((addr, len)),
                _ => None,
            })
            .collect()
    }

    /// (granularity, address) of every erase
    pub fn erases(&self) -> Vec<(EraseKind, u32)> {
        self.operations
            .iter()
            .filter_map(|op| match *op {
                Operation::Erase { kind, addr } => Some((kind, addr)),
                _ => None,
            })
            .collect()
    }

    /// Total time the driver asked to wait, in microseconds
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Check if chip select is currently asserted
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Check if the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Fail the `n`th write call from now (zero-based)
    pub fn fail_nth_write(&mut self, n: usize) {
        self.fail_write_at = Some(self.writes + n);
    }

    /// Fail the `n`th read call from now (zero-based)
    pub fn fail_nth_read(&mut self, n: usize) {
        self.fail_read_at = Some(self.reads + n);
    }

    /// Report the bus as still shifting after every transfer
    pub fn set_bus_busy(&mut self, busy: bool) {
        self.bus_busy = busy;
    }

    /// Keep WIP set forever
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    fn status_byte(&self) -> u8 {
        let mut status = Status::from_bits_retain(self.status);
        status.set(Status::WEL, self.write_enabled);
        status.set(Status::WIP, self.stuck_busy || self.busy_remaining > 0);
        status.bits()
    }

    /// Address bytes of the current frame
    fn frame_address(&self) -> Option<u32> {
        let bytes = self.frame.get(1..FRAME_HEADER_LEN)?;
        Some(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }

    fn respond(&mut self, buf: &mut [u8]) {
        let Some(&opcode) = self.frame.first() else {
            buf.fill(0xFF);
            return;
        };
        let ops = self.opcodes;

        if opcode == ops.read_status {
            let status = self.status_byte();
            buf.fill(status);
            self.busy_remaining = self.busy_remaining.saturating_sub(1);
        } else if opcode == ops.read_config {
            buf.fill(self.config);
        } else if opcode == ops.read_id {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = self.id.get(self.read_pos + i).copied().unwrap_or(0xFF);
            }
        } else if opcode == ops.read_data {
            let Some(addr) = self.frame_address() else {
                buf.fill(0xFF);
                return;
            };
            let volume = self.data.len();
            for (i, b) in buf.iter_mut().enumerate() {
                *b = self.data[(addr as usize + self.read_pos + i) % volume];
            }
        } else {
            log::warn!("dummy: read for unsupported opcode 0x{:02X}", opcode);
            buf.fill(0xFF);
        }
        self.read_pos += buf.len();
    }

    /// Run the write-type command collected in the current frame
    fn execute(&mut self) {
        let Some(&opcode) = self.frame.first() else {
            return;
        };
        let ops = self.opcodes;

        if opcode == ops.write_enable {
            self.write_enabled = true;
        } else if opcode == ops.write_disable {
            self.write_enabled = false;
        } else if opcode == ops.write_status {
            if self.guard_write(opcode) {
                if let Some(&value) = self.frame.get(1) {
                    self.status = value & !(Status::WIP | Status::WEL).bits();
                    self.operations.push(Operation::WriteStatus(value));
                }
                if let Some(&value) = self.frame.get(2) {
                    self.config = value;
                }
                self.finish_write();
            }
        } else if opcode == ops.page_program {
            if self.guard_write(opcode) {
                self.page_program();
                self.finish_write();
            }
        } else if opcode == ops.sector_erase {
            self.erase_unit(opcode, EraseKind::Sector);
        } else if opcode == ops.block32_erase {
            self.erase_unit(opcode, EraseKind::Block32);
        } else if opcode == ops.block64_erase {
            self.erase_unit(opcode, EraseKind::Block64);
        } else if opcode == ops.chip_erase {
            if self.guard_write(opcode) {
                self.data.fill(0xFF);
                self.operations.push(Operation::Erase {
                    kind: EraseKind::Chip,
                    addr: 0,
                });
                self.finish_write();
            }
        }
    }

    /// Real parts ignore mutating commands without the write enable latch
    /// or while a previous one is still running
    fn guard_write(&self, opcode: u8) -> bool {
        if !self.write_enabled {
            log::warn!("dummy: opcode 0x{:02X} ignored, WEL clear", opcode);
            return false;
        }
        if self.stuck_busy || self.busy_remaining > 0 {
            log::warn!("dummy: opcode 0x{:02X} ignored, chip busy", opcode);
            return false;
        }
        true
    }

    fn finish_write(&mut self) {
        self.write_enabled = false;
        self.busy_remaining = self.busy_polls;
    }

    fn page_program(&mut self) {
        let Some(addr) = self.frame_address() else {
            return;
        };
        let page = self.chip.page_size as usize;
        let addr = addr as usize % self.data.len();
        let base = addr - addr % page;
        let payload = &self.frame[FRAME_HEADER_LEN..];

        // Data past the end of the page wraps to its start
        for (i, &byte) in payload.iter().enumerate() {
            let target = base + (addr - base + i) % page;
            self.data[target] &= byte;
        }
        self.operations.push(Operation::Program {
            addr: addr as u32,
            len: payload.len(),
        });
    }

    fn erase_unit(&mut self, opcode: u8, kind: EraseKind) {
        if !self.guard_write(opcode) {
            return;
        }
        let Some(addr) = self.frame_address() else {
            return;
        };
        let size = self.chip.erase_size(kind) as usize;
        let start = (addr as usize % self.data.len()) / size * size;
        let end = (start + size).min(self.data.len());
        self.data[start..end].fill(0xFF);
        self.operations.push(Operation::Erase { kind, addr });
        self.finish_write();
    }
}

#[cfg(feature = "alloc")]
impl Transport for EmulatedChip {
    fn select(&mut self) -> Result<(), TransportError> {
        if self.selected {
            return Err(TransportError);
        }
        self.selected = true;
        self.frame.clear();
        self.read_pos = 0;
        self.aborted = false;
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        if !self.selected {
            return Err(TransportError);
        }
        if !self.aborted {
            self.execute();
        }
        self.selected = false;
        Ok(())
    }

    fn is_busy(&mut self) -> bool {
        self.bus_busy
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let index = self.writes;
        self.writes += 1;
        if !self.selected || self.fail_write_at == Some(index) {
            self.aborted = true;
            return Err(TransportError);
        }
        self.frame.extend_from_slice(data);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let index = self.reads;
        self.reads += 1;
        if !self.selected || self.fail_read_at == Some(index) {
            self.aborted = true;
            return Err(TransportError);
        }
        self.respond(buf);
        Ok(())
    }

    fn delay_us(&mut self, us: u32) -> Result<(), TransportError> {
        self.elapsed_us += u64::from(us);
        Ok(())
    }
}
