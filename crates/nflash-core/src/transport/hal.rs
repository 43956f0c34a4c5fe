//! embedded-hal 1.0 transport adapter

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::{Transport, TransportError};

/// [`Transport`] over an embedded-hal SPI bus, chip-select pin and delay
///
/// Chip select is active low. The bus is flushed before chip select is
/// released, so `is_busy` never reports a transfer in flight.
pub struct HalTransport<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
}

impl<SPI, CS, D> HalTransport<SPI, CS, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a new adapter
    ///
    /// The bus must already be configured for the flash part's SPI mode.
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self { spi, cs, delay }
    }

    /// Release the bus, pin and delay
    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }
}

impl<SPI, CS, D> Transport for HalTransport<SPI, CS, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    D: DelayNs,
{
    fn select(&mut self) -> Result<(), TransportError> {
        self.cs.set_low().map_err(|_| TransportError)
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        // Make sure the last byte is out before the chip latches the command
        let flushed = self.spi.flush().map_err(|_| TransportError);
        self.cs.set_high().map_err(|_| TransportError)?;
        flushed
    }

    fn is_busy(&mut self) -> bool {
        self.spi.flush().is_err()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.spi.write(data).map_err(|_| TransportError)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.spi.read(buf).map_err(|_| TransportError)
    }

    fn delay_us(&mut self, us: u32) -> Result<(), TransportError> {
        self.delay.delay_us(us);
        Ok(())
    }
}
