//! Chip-level SPI-NOR driver
//!
//! [`FlashDriver`] binds a [`ChipDescriptor`](crate::chip::ChipDescriptor),
//! an [`OpcodeTable`](crate::spi::OpcodeTable) and a
//! [`Transport`](crate::transport::Transport). Every mutating command
//! follows the same sequence: read status, refuse if the chip is busy, set
//! the write enable latch if needed, issue the command, then poll the
//! status register until the write-in-progress bit clears.

mod driver;
mod poll;
mod request;

pub use driver::FlashDriver;
pub use poll::{PollLimit, DEFAULT_MAX_POLLS};
pub use request::ProgramRequest;
