//! Transport trait definition

use core::fmt;

/// A failed transport call
///
/// The driver does not distinguish transport failures: any of them aborts
/// the current command with [`crate::DriverError::Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportError;

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

/// Byte-level SPI bus with a chip-select line and a blocking delay
///
/// A command is one or more `write`/`read` calls between `select` and
/// `deselect`. The transport is owned exclusively by one driver for the
/// duration of each call; it needs no internal locking.
///
/// ## Example
///
/// ```ignore
/// impl Transport for BoardSpi {
///     fn select(&mut self) -> Result<(), TransportError> {
///         self.cs.set_low();
///         Ok(())
///     }
///
///     fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
///         self.spi.blocking_write(data).map_err(|_| TransportError)
///     }
///     // ...
/// }
/// ```
pub trait Transport {
    /// Assert chip select
    fn select(&mut self) -> Result<(), TransportError>;

    /// Deassert chip select
    fn deselect(&mut self) -> Result<(), TransportError>;

    /// Check if the bus is still shifting data
    ///
    /// Checked after every write and read; a busy bus at that point is a
    /// transport failure.
    fn is_busy(&mut self) -> bool;

    /// Write bytes to the bus
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read `buf.len()` bytes from the bus
    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Block for the given number of microseconds
    fn delay_us(&mut self, us: u32) -> Result<(), TransportError>;
}

// Lets a driver borrow a transport the caller keeps ownership of
impl<T: Transport + ?Sized> Transport for &mut T {
    fn select(&mut self) -> Result<(), TransportError> {
        (**self).select()
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        (**self).deselect()
    }

    fn is_busy(&mut self) -> bool {
        (**self).is_busy()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read(buf)
    }

    fn delay_us(&mut self, us: u32) -> Result<(), TransportError> {
        (**self).delay_us(us)
    }
}

#[cfg(feature = "alloc")]
impl Transport for alloc::boxed::Box<dyn Transport + Send> {
    fn select(&mut self) -> Result<(), TransportError> {
        (**self).select()
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        (**self).deselect()
    }

    fn is_busy(&mut self) -> bool {
        (**self).is_busy()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read(buf)
    }

    fn delay_us(&mut self, us: u32) -> Result<(), TransportError> {
        (**self).delay_us(us)
    }
}
