//! Address encoding

/// Number of address bytes sent on the wire
pub const ADDRESS_BYTES: usize = 3;

/// Length of an opcode + address header
pub const FRAME_HEADER_LEN: usize = 1 + ADDRESS_BYTES;

/// A 32-bit flash address
///
/// Chips handled here are 24-bit addressed: the most significant byte of
/// the value is dropped on the wire and the rest is sent MSB first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub u32);

impl Address {
    /// Wire bytes of this address, most significant first
    pub const fn to_bytes(self) -> [u8; ADDRESS_BYTES] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    /// Raw 32-bit value
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

/// Build the opcode + address header of a command
pub fn encode_header(opcode: u8, addr: Address) -> [u8; FRAME_HEADER_LEN] {
    let a = addr.to_bytes();
    [opcode, a[0], a[1], a[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        assert_eq!(Address(0x0012_3456).to_bytes(), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_top_byte_dropped() {
        assert_eq!(Address(0xAB12_3456).to_bytes(), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_header() {
        assert_eq!(encode_header(0x02, Address(0x3F_FF00)), [0x02, 0x3F, 0xFF, 0x00]);
    }
}
