//! Status register bits

use bitflags::bitflags;

bitflags! {
    /// Status register 1
    ///
    /// Only WIP and WEL are interpreted by the driver; the protection bits
    /// are reported as read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// Write In Progress / Busy
        const WIP  = 1 << 0;
        /// Write Enable Latch
        const WEL  = 1 << 1;
        /// Block Protect bit 0
        const BP0  = 1 << 2;
        /// Block Protect bit 1
        const BP1  = 1 << 3;
        /// Block Protect bit 2
        const BP2  = 1 << 4;
        /// Block Protect bit 3
        const BP3  = 1 << 5;
        /// Quad Enable (Macronix)
        const QE   = 1 << 6;
        /// Status Register Write Disable
        const SRWD = 1 << 7;
    }
}

impl Status {
    /// Chip is executing a program or erase
    pub fn is_busy(self) -> bool {
        self.contains(Self::WIP)
    }

    /// Write enable latch is set
    pub fn write_enabled(self) -> bool {
        self.contains(Self::WEL)
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::empty()
    }
}
