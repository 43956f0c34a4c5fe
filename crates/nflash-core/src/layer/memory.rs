//! Virtual read / write / change / erase over a window

use log::debug;

use super::types::LayerDescriptor;
use crate::error::{LayerError, LayoutError};
use crate::flash::{FlashDriver, ProgramRequest};
use crate::transport::Transport;

/// A window of the chip addressed from zero
///
/// Borrows the driver for its lifetime; open another layer once this one
/// is dropped to work on a different window.
pub struct MemoryLayer<'l, 'a, T: Transport> {
    flash: &'l mut FlashDriver<'a, T>,
    descriptor: LayerDescriptor,
}

impl<'l, 'a, T: Transport> MemoryLayer<'l, 'a, T> {
    /// Open a layer, checking the chip geometry and the window
    pub fn new(
        flash: &'l mut FlashDriver<'a, T>,
        descriptor: LayerDescriptor,
    ) -> Result<Self, LayoutError> {
        flash.chip().validate()?;
        descriptor.validate(flash.chip())?;
        Ok(Self { flash, descriptor })
    }

    /// The window this layer covers
    pub fn descriptor(&self) -> LayerDescriptor {
        self.descriptor
    }

    /// Window size in bytes
    pub fn volume(&self) -> u32 {
        self.descriptor.volume
    }

    /// Check that `len` bytes at `vaddr` lie inside the window
    fn check_range(&self, vaddr: u32, len: usize) -> Result<(), LayerError> {
        if !self.descriptor.contains(vaddr) {
            return Err(LayerError::AddressOutOfRange);
        }
        let room = (self.descriptor.volume - vaddr) as usize;
        if len == 0 || len > room {
            return Err(LayerError::InvalidLength);
        }
        Ok(())
    }

    /// Write `data` at `vaddr`
    ///
    /// Each chunk that starts on a sector boundary erases that sector
    /// first. Chunks never cross a page. A failure leaves the chunks
    /// already written in place.
    pub fn write(&mut self, vaddr: u32, data: &[u8]) -> Result<(), LayerError> {
        self.check_range(vaddr, data.len())?;

        let chip = self.flash.chip();
        let mut offset = vaddr;
        let mut rest = data;
        while !rest.is_empty() {
            let faddr = self.descriptor.physical(offset);
            let chunk = rest.len().min(chip.page_remaining(faddr) as usize);

            if chip.is_sector_start(offset) {
                debug!("erase sector 0x{:06X} before write", faddr);
                self.flash.sector_erase(faddr).map_err(LayerError::Erase)?;
            }

            let (head, tail) = rest.split_at(chunk);
            self.flash
                .write_page_data(faddr, ProgramRequest::Unframed(head))
                .map_err(LayerError::Program)?;

            offset += chunk as u32;
            rest = tail;
        }
        Ok(())
    }

    /// Program `data` at `vaddr` without erasing
    ///
    /// Only 1 to 0 bit transitions take effect. The data must fit in the
    /// page containing `vaddr`.
    pub fn change(&mut self, vaddr: u32, data: &[u8]) -> Result<(), LayerError> {
        self.check_range(vaddr, data.len())?;

        let faddr = self.descriptor.physical(vaddr);
        if data.len() > self.flash.chip().page_remaining(faddr) as usize {
            return Err(LayerError::InvalidLength);
        }
        self.flash
            .write_page_data(faddr, ProgramRequest::Unframed(data))
            .map_err(LayerError::Program)
    }

    /// Read `buf.len()` bytes from `vaddr`
    pub fn read(&mut self, vaddr: u32, buf: &mut [u8]) -> Result<(), LayerError> {
        self.check_range(vaddr, buf.len())?;
        let faddr = self.descriptor.physical(vaddr);
        self.flash.read_data(faddr, buf).map_err(LayerError::Read)
    }

    /// Erase the whole window
    ///
    /// Uses 64KB blocks when the window start is 64KB aligned, else 32KB
    /// blocks when it is 32KB aligned, falling back to sectors for the
    /// tail that a block would overrun.
    pub fn erase_region(&mut self) -> Result<(), LayerError> {
        let mut offset = 0;
        while offset < self.descriptor.volume {
            let kind = self
                .descriptor
                .erase_kind(self.flash.chip(), self.descriptor.volume - offset);
            let faddr = self.descriptor.physical(offset);
            debug!("{} erase at 0x{:06X}", kind, faddr);
            self.flash.erase(kind, faddr).map_err(LayerError::Erase)?;
            offset += self.flash.chip().erase_size(kind);
        }
        Ok(())
    }
}
