//! Error types for nflash-core
//!
//! Each layer of the stack has its own small, no_std compatible
//! error enum. Layer errors wrap the driver error that caused them so the
//! caller can tell which sub-operation failed and why.

use core::fmt;

/// Errors reported by the flash driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// A transport call failed or left the bus busy
    Transport,
    /// Address is beyond the chip volume
    AddressOutOfRange,
    /// Data does not fit the operation (crosses a page, erase address past the end,
    /// frame too short for its header)
    InvalidData,
    /// The chip reported a write in progress before the command was issued
    Busy,
    /// The chip stayed busy for longer than the poll limit allows
    Timeout,
}

/// Errors reported by the memory layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    /// Virtual address is outside the window
    AddressOutOfRange,
    /// Length is zero, runs past the window end, or crosses a page on `change`
    InvalidLength,
    /// A sector or block erase failed
    Erase(DriverError),
    /// A page program failed
    Program(DriverError),
    /// A data read failed
    Read(DriverError),
}

/// Errors found while building or validating window descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Window start or size is not a multiple of the sector size
    Unaligned {
        /// Offending value (start address or size)
        value: u32,
        /// Required alignment
        alignment: u32,
    },
    /// Window runs past the end of the chip
    OutOfBounds,
    /// Window has zero size
    Empty,
    /// Two windows share at least one byte
    Overlapping,
    /// Two windows have the same name
    DuplicateName,
    /// No window with the requested name
    WindowNotFound,
    /// Chip model not in the catalogue
    UnknownChip,
    /// Chip descriptor violates its geometry invariants
    InvalidGeometry,
    /// Failed to parse a window table
    ParseError,
    /// I/O error while loading a window table
    IoError,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failure"),
            Self::AddressOutOfRange => write!(f, "address beyond chip volume"),
            Self::InvalidData => write!(f, "invalid data length or address for operation"),
            Self::Busy => write!(f, "chip busy"),
            Self::Timeout => write!(f, "chip did not become ready in time"),
        }
    }
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddressOutOfRange => write!(f, "address outside window"),
            Self::InvalidLength => write!(f, "invalid length for window operation"),
            Self::Erase(e) => write!(f, "erase failed: {}", e),
            Self::Program(e) => write!(f, "page program failed: {}", e),
            Self::Read(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaligned { value, alignment } => write!(
                f,
                "0x{:08X} is not aligned to 0x{:X} bytes",
                value, alignment
            ),
            Self::OutOfBounds => write!(f, "window extends beyond chip volume"),
            Self::Empty => write!(f, "window has zero size"),
            Self::Overlapping => write!(f, "overlapping windows"),
            Self::DuplicateName => write!(f, "duplicate window name"),
            Self::WindowNotFound => write!(f, "window not found"),
            Self::UnknownChip => write!(f, "unknown chip model"),
            Self::InvalidGeometry => write!(f, "invalid chip geometry"),
            Self::ParseError => write!(f, "failed to parse window table"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {}

#[cfg(feature = "std")]
impl std::error::Error for LayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Erase(e) | Self::Program(e) | Self::Read(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

/// Result type alias using the driver error type
pub type Result<T> = core::result::Result<T, DriverError>;
