//! SPI-NOR command sequences

use log::{debug, trace, warn};

use super::poll::PollLimit;
use super::request::ProgramRequest;
use crate::chip::{ChipDescriptor, ChipId, EraseKind};
use crate::error::{DriverError, LayoutError, Result};
use crate::layer::{LayerDescriptor, MemoryLayer};
use crate::spi::{encode_header, Address, OpcodeTable, Status};
use crate::transport::{Transport, TransportError};

/// Chip-level driver for one SPI-NOR part
///
/// Holds no cached chip state: the status register is re-read before and
/// after every mutating command.
pub struct FlashDriver<'a, T: Transport> {
    chip: &'a ChipDescriptor,
    opcodes: &'a OpcodeTable,
    transport: T,
    poll_limit: PollLimit,
}

/// Write `data` and check that the bus settled
fn send<T: Transport>(
    transport: &mut T,
    data: &[u8],
) -> core::result::Result<(), TransportError> {
    transport.write(data)?;
    if transport.is_busy() {
        return Err(TransportError);
    }
    Ok(())
}

/// Read into `buf` and check that the bus settled
fn recv<T: Transport>(
    transport: &mut T,
    buf: &mut [u8],
) -> core::result::Result<(), TransportError> {
    transport.read(buf)?;
    if transport.is_busy() {
        return Err(TransportError);
    }
    Ok(())
}

impl<'a, T: Transport> FlashDriver<'a, T> {
    /// Bind a chip descriptor and opcode table to a transport
    ///
    /// The descriptor is trusted as given; use [`FlashDriver::try_new`] for
    /// hand-built descriptors.
    pub fn new(chip: &'a ChipDescriptor, opcodes: &'a OpcodeTable, transport: T) -> Self {
        Self {
            chip,
            opcodes,
            transport,
            poll_limit: PollLimit::default(),
        }
    }

    /// Like [`FlashDriver::new`], but reject a descriptor whose geometry
    /// does not pass [`ChipDescriptor::validate`]
    pub fn try_new(
        chip: &'a ChipDescriptor,
        opcodes: &'a OpcodeTable,
        transport: T,
    ) -> core::result::Result<Self, LayoutError> {
        chip.validate()?;
        Ok(Self::new(chip, opcodes, transport))
    }

    /// Set how long completion polling may run
    pub fn with_poll_limit(mut self, limit: PollLimit) -> Self {
        self.poll_limit = limit;
        self
    }

    /// Get the chip descriptor
    pub fn chip(&self) -> &'a ChipDescriptor {
        self.chip
    }

    /// Get the opcode table
    pub fn opcodes(&self) -> &'a OpcodeTable {
        self.opcodes
    }

    /// Get the completion poll bound
    pub fn poll_limit(&self) -> PollLimit {
        self.poll_limit
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Open a memory layer over a window of this chip
    ///
    /// The window must be sector aligned and inside the chip.
    pub fn layer(
        &mut self,
        descriptor: LayerDescriptor,
    ) -> core::result::Result<MemoryLayer<'_, 'a, T>, LayoutError> {
        MemoryLayer::new(self, descriptor)
    }

    /// Run one chip-select frame
    ///
    /// Chip select is released even when the body fails.
    fn transaction<F>(&mut self, body: F) -> Result<()>
    where
        F: FnOnce(&mut T) -> core::result::Result<(), TransportError>,
    {
        self.transport
            .select()
            .map_err(|_| DriverError::Transport)?;
        let result = body(&mut self.transport);
        let released = self.transport.deselect();
        result.map_err(|_| DriverError::Transport)?;
        released.map_err(|_| DriverError::Transport)
    }

    /// Send a single-byte command
    fn command(&mut self, opcode: u8) -> Result<()> {
        trace!("cmd 0x{:02X}", opcode);
        self.transaction(|t| send(t, &[opcode]))
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<Status> {
        let opcode = self.opcodes.read_status;
        let mut buf = [0u8; 1];
        self.transaction(|t| {
            send(t, &[opcode])?;
            recv(t, &mut buf)
        })?;
        Ok(Status::from_bits_retain(buf[0]))
    }

    /// Read the configuration register
    pub fn read_config(&mut self) -> Result<u8> {
        let opcode = self.opcodes.read_config;
        let mut buf = [0u8; 1];
        self.transaction(|t| {
            send(t, &[opcode])?;
            recv(t, &mut buf)
        })?;
        Ok(buf[0])
    }

    /// Set the write enable latch
    pub fn write_enable(&mut self) -> Result<()> {
        self.command(self.opcodes.write_enable)
    }

    /// Clear the write enable latch
    pub fn write_disable(&mut self) -> Result<()> {
        self.command(self.opcodes.write_disable)
    }

    /// Read the identification bytes
    pub fn read_chip_id(&mut self) -> Result<ChipId> {
        let opcode = self.opcodes.read_id;
        let mut id = ChipId::default();
        id.0
            .resize(self.chip.id_length as usize, 0)
            .map_err(|_| DriverError::InvalidData)?;
        self.transaction(|t| {
            send(t, &[opcode])?;
            recv(t, &mut id.0[..])
        })?;
        trace!("chip id: {}", id);
        Ok(id)
    }

    /// Read `buf.len()` bytes starting at `faddr`
    ///
    /// Reads may run across pages and sectors.
    pub fn read_data(&mut self, faddr: u32, buf: &mut [u8]) -> Result<()> {
        if !self.chip.is_valid_address(faddr) {
            return Err(DriverError::AddressOutOfRange);
        }
        let header = encode_header(self.opcodes.read_data, Address(faddr));
        trace!("read 0x{:06X} len {}", faddr, buf.len());
        self.transaction(|t| {
            send(t, &header)?;
            recv(t, buf)
        })
    }

    /// Program up to one page starting at `faddr`
    ///
    /// The payload must not be empty and must end within the page that
    /// contains `faddr`. Programming only clears bits.
    pub fn write_page_data(&mut self, faddr: u32, request: ProgramRequest<'_>) -> Result<()> {
        if !self.chip.is_valid_address(faddr) {
            return Err(DriverError::AddressOutOfRange);
        }
        let len = request.payload_len()?;
        if len == 0 || len > self.chip.page_remaining(faddr) as usize {
            return Err(DriverError::InvalidData);
        }

        self.prepare_write()?;

        let header = encode_header(self.opcodes.page_program, Address(faddr));
        trace!("program 0x{:06X} len {}", faddr, len);
        match request {
            ProgramRequest::Framed(frame) if self.chip.fast_write => {
                frame[..header.len()].copy_from_slice(&header);
                let frame: &[u8] = frame;
                self.transaction(|t| send(t, frame))?;
            }
            request => {
                let data = request.into_payload();
                self.transaction(|t| {
                    send(t, &header)?;
                    send(t, data)
                })?;
            }
        }

        self.wait_ready(self.chip.page_write_timeout_us as u32)
    }

    /// Erase the 4KB sector containing `faddr`
    pub fn sector_erase(&mut self, faddr: u32) -> Result<()> {
        self.erase(EraseKind::Sector, faddr)
    }

    /// Erase the 32KB block containing `faddr`
    pub fn block32_erase(&mut self, faddr: u32) -> Result<()> {
        self.erase(EraseKind::Block32, faddr)
    }

    /// Erase the 64KB block containing `faddr`
    pub fn block64_erase(&mut self, faddr: u32) -> Result<()> {
        self.erase(EraseKind::Block64, faddr)
    }

    /// Erase the whole chip
    pub fn chip_erase(&mut self) -> Result<()> {
        self.prepare_write()?;
        debug!("chip erase");
        self.command(self.opcodes.chip_erase)?;
        self.wait_ready(self.chip.erase_poll_interval_us(EraseKind::Chip))
    }

    /// Erase one unit of the given granularity
    ///
    /// `faddr` is ignored for [`EraseKind::Chip`].
    pub fn erase(&mut self, kind: EraseKind, faddr: u32) -> Result<()> {
        let opcode = match kind {
            EraseKind::Sector => self.opcodes.sector_erase,
            EraseKind::Block32 => self.opcodes.block32_erase,
            EraseKind::Block64 => self.opcodes.block64_erase,
            EraseKind::Chip => return self.chip_erase(),
        };
        if faddr > self.chip.volume.saturating_sub(1) {
            return Err(DriverError::InvalidData);
        }

        self.prepare_write()?;

        let header = encode_header(opcode, Address(faddr));
        trace!("{} erase 0x{:06X}", kind, faddr);
        self.transaction(|t| send(t, &header))?;
        self.wait_ready(self.chip.erase_poll_interval_us(kind))
    }

    /// Write the status register
    pub fn write_status(&mut self, value: u8) -> Result<()> {
        self.prepare_write()?;
        let opcode = self.opcodes.write_status;
        trace!("write status 0x{:02X}", value);
        self.transaction(|t| send(t, &[opcode, value]))?;
        self.wait_ready(self.chip.page_write_timeout_us as u32)
    }

    /// Refuse to start while the chip is busy, and set the write enable
    /// latch if it is clear
    fn prepare_write(&mut self) -> Result<()> {
        let status = self.read_status()?;
        if status.is_busy() {
            warn!("chip busy before command (status 0x{:02X})", status.bits());
            return Err(DriverError::Busy);
        }
        if !status.write_enabled() {
            self.write_enable()?;
        }
        Ok(())
    }

    /// Poll the status register until the write in progress bit clears
    fn wait_ready(&mut self, poll_delay_us: u32) -> Result<()> {
        let mut waited = 0u32;
        loop {
            if !self.read_status()?.is_busy() {
                return Ok(());
            }
            if !self.poll_limit.allows(waited) {
                warn!("chip still busy after {} polls", waited);
                return Err(DriverError::Timeout);
            }
            self.transport
                .delay_us(poll_delay_us)
                .map_err(|_| DriverError::Transport)?;
            waited = waited.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::chip::parts::MX25L3233F;
    use crate::testutil::{Event, MockBus};

    fn driver(bus: MockBus) -> FlashDriver<'static, MockBus> {
        FlashDriver::new(&MX25L3233F.chip, &MX25L3233F.opcodes, bus)
    }

    #[test]
    fn test_try_new_checks_geometry() {
        let mut chip = MX25L3233F.chip;
        chip.page_size = 0;
        assert!(matches!(
            FlashDriver::try_new(&chip, &MX25L3233F.opcodes, MockBus::new()),
            Err(LayoutError::InvalidGeometry)
        ));
        let flash = FlashDriver::try_new(&MX25L3233F.chip, &MX25L3233F.opcodes, MockBus::new());
        assert!(flash.is_ok());
    }

    #[test]
    fn test_read_chip_id() {
        let mut flash = driver(MockBus::new().with_read_data(&[0xC2, 0x20, 0x16]));
        let id = flash.read_chip_id().unwrap();
        assert_eq!(id.as_bytes(), &[0xC2, 0x20]);
        assert_eq!(flash.transport().commands(), vec![vec![0x9F]]);
    }

    #[test]
    fn test_read_data() {
        let mut flash = driver(MockBus::new().with_read_data(&[1, 2, 3]));
        let mut buf = [0u8; 3];
        flash.read_data(0x12_3456, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(
            flash.transport().commands(),
            vec![vec![0x03, 0x12, 0x34, 0x56]]
        );
    }

    #[test]
    fn test_read_data_out_of_range() {
        let mut flash = driver(MockBus::new());
        let mut buf = [0u8; 1];
        assert_eq!(
            flash.read_data(0x40_0000, &mut buf),
            Err(DriverError::AddressOutOfRange)
        );
        assert!(flash.transport().events.is_empty());
    }

    #[test]
    fn test_write_page_sequence() {
        // pre-check idle, then busy for one poll
        let bus = MockBus::new().with_statuses(&[0x00, 0x01, 0x00]);
        let mut flash = driver(bus);
        flash
            .write_page_data(0x100, ProgramRequest::Unframed(&[0xAA, 0xBB]))
            .unwrap();

        let bus = flash.transport();
        assert_eq!(
            bus.commands(),
            vec![
                vec![0x05],
                vec![0x06],
                vec![0x02, 0x00, 0x01, 0x00, 0xAA, 0xBB],
                vec![0x05],
                vec![0x05],
            ]
        );
        assert_eq!(bus.delays(), vec![60]);
        assert!(bus.events.contains(&Event::Write(vec![0xAA, 0xBB])));
    }

    #[test]
    fn test_write_skips_wren_when_latched() {
        let bus = MockBus::new().with_statuses(&[0x02]);
        let mut flash = driver(bus);
        flash
            .write_page_data(0, ProgramRequest::Unframed(&[0x00]))
            .unwrap();
        assert_eq!(
            flash.transport().commands(),
            vec![vec![0x05], vec![0x02, 0, 0, 0, 0x00], vec![0x05]]
        );
    }

    #[test]
    fn test_fast_write_single_transfer() {
        let chip = MX25L3233F.chip.with_fast_write(true);
        let mut flash = FlashDriver::new(&chip, &MX25L3233F.opcodes, MockBus::new());
        let mut frame = [0, 0, 0, 0, 0xAA, 0xBB];
        flash
            .write_page_data(0x10, ProgramRequest::Framed(&mut frame))
            .unwrap();

        let bus = flash.transport();
        assert!(bus
            .events
            .contains(&Event::Write(vec![0x02, 0x00, 0x00, 0x10, 0xAA, 0xBB])));
        // RDSR, WREN, PP frame, RDSR
        assert_eq!(bus.write_calls(), 4);
    }

    #[test]
    fn test_framed_without_fast_write() {
        let mut flash = driver(MockBus::new());
        let mut frame = [0, 0, 0, 0, 0xAA, 0xBB];
        flash
            .write_page_data(0x10, ProgramRequest::Framed(&mut frame))
            .unwrap();

        let bus = flash.transport();
        assert!(bus.events.contains(&Event::Write(vec![0x02, 0x00, 0x00, 0x10])));
        assert!(bus.events.contains(&Event::Write(vec![0xAA, 0xBB])));
        assert_eq!(bus.write_calls(), 5);
    }

    #[test]
    fn test_write_crossing_page() {
        let mut flash = driver(MockBus::new());
        let data = [0u8; 7];
        assert_eq!(
            flash.write_page_data(250, ProgramRequest::Unframed(&data)),
            Err(DriverError::InvalidData)
        );
        assert_eq!(
            flash.write_page_data(250, ProgramRequest::Unframed(&[])),
            Err(DriverError::InvalidData)
        );
        assert!(flash.transport().events.is_empty());
    }

    #[test]
    fn test_write_when_busy() {
        let mut flash = driver(MockBus::new().with_statuses(&[0x01]));
        assert_eq!(
            flash.write_page_data(0, ProgramRequest::Unframed(&[0])),
            Err(DriverError::Busy)
        );
        assert_eq!(flash.transport().commands(), vec![vec![0x05]]);
    }

    #[test]
    fn test_poll_timeout() {
        let mut bus = MockBus::new().with_statuses(&[0x00]);
        bus.idle_status = 0x03;
        let mut flash = driver(bus).with_poll_limit(PollLimit::Polls(3));
        assert_eq!(flash.sector_erase(0), Err(DriverError::Timeout));
        assert_eq!(flash.transport().delays(), vec![5_000; 3]);
    }

    #[test]
    fn test_block64_erase() {
        let bus = MockBus::new().with_statuses(&[0x00, 0x03, 0x00]);
        let mut flash = driver(bus);
        flash.block64_erase(0x1_0000).unwrap();
        let bus = flash.transport();
        assert_eq!(
            bus.commands(),
            vec![
                vec![0x05],
                vec![0x06],
                vec![0xD8, 0x01, 0x00, 0x00],
                vec![0x05],
                vec![0x05],
            ]
        );
        assert_eq!(bus.delays(), vec![200_000]);
    }

    #[test]
    fn test_erase_past_end() {
        let mut flash = driver(MockBus::new());
        assert_eq!(flash.sector_erase(0x40_0000), Err(DriverError::InvalidData));
        assert!(flash.transport().events.is_empty());
        assert!(flash.sector_erase(0x3F_FFFF).is_ok());
    }

    #[test]
    fn test_chip_erase() {
        let bus = MockBus::new().with_statuses(&[0x00, 0x01, 0x00]);
        let mut flash = driver(bus);
        flash.chip_erase().unwrap();
        assert!(flash.transport().commands().contains(&vec![0x60]));
        assert_eq!(flash.transport().delays(), vec![500_000]);
    }

    #[test]
    fn test_write_status() {
        let mut flash = driver(MockBus::new());
        flash.write_status(0x3C).unwrap();
        assert_eq!(
            flash.transport().commands(),
            vec![vec![0x05], vec![0x06], vec![0x01, 0x3C], vec![0x05]]
        );
    }

    #[test]
    fn test_transport_failure_releases_cs() {
        let mut bus = MockBus::new();
        bus.fail_write = Some(0);
        let mut flash = driver(bus);
        assert_eq!(flash.read_status(), Err(DriverError::Transport));
        assert!(flash.transport().balanced());
    }

    #[test]
    fn test_busy_bus_is_transport_error() {
        let mut bus = MockBus::new();
        bus.busy = true;
        let mut flash = driver(bus);
        let mut buf = [0u8; 4];
        assert_eq!(flash.read_data(0, &mut buf), Err(DriverError::Transport));
        assert!(flash.transport().balanced());
    }
}
