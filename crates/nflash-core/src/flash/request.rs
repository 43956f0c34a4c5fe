//! Page program payloads

use crate::error::{DriverError, Result};
use crate::spi::FRAME_HEADER_LEN;

/// Data for one page program
///
/// A `Framed` buffer reserves its first [`FRAME_HEADER_LEN`] bytes for the
/// opcode and address. On a part with fast write enabled the driver fills
/// them in and sends the whole buffer in a single bus write; otherwise the
/// reserved bytes are skipped and the payload goes out as a second write.
#[derive(Debug)]
pub enum ProgramRequest<'a> {
    /// Payload only
    Unframed(&'a [u8]),
    /// Header space followed by the payload
    Framed(&'a mut [u8]),
}

impl<'a> ProgramRequest<'a> {
    /// Number of payload bytes to program
    ///
    /// Fails with [`DriverError::InvalidData`] if a framed buffer has no
    /// room for its header.
    pub fn payload_len(&self) -> Result<usize> {
        match self {
            Self::Unframed(data) => Ok(data.len()),
            Self::Framed(frame) => frame
                .len()
                .checked_sub(FRAME_HEADER_LEN)
                .ok_or(DriverError::InvalidData),
        }
    }

    /// The payload, without any header space
    pub fn into_payload(self) -> &'a [u8] {
        match self {
            Self::Unframed(data) => data,
            Self::Framed(frame) => {
                let frame: &'a [u8] = frame;
                frame.get(FRAME_HEADER_LEN..).unwrap_or(&[])
            }
        }
    }
}

impl<'a> From<&'a [u8]> for ProgramRequest<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::Unframed(data)
    }
}
