//! nflash-core - SPI-NOR flash driver and windowed memory layer
//!
//! This crate provides a two-layer storage stack for SPI-NOR flash chips.
//! It is designed to be `no_std` compatible for use in embedded environments.
//!
//! - [`flash::FlashDriver`] speaks the SPI-NOR command protocol: read,
//!   page program, sector/block/chip erase, with status-register polling
//!   and write-enable latch handling.
//! - [`layer::MemoryLayer`] maps a sector-aligned window of the chip onto a
//!   flat virtual address space, erasing before writes and splitting writes
//!   at page boundaries.
//!
//! The bus itself is supplied by the caller through the
//! [`transport::Transport`] trait.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`, TOML window tables)
//! - `alloc` - Enable heap allocation for window tables
//! - `embedded-hal` - `Transport` adapter for embedded-hal 1.0 SPI buses
//!
//! # Example
//!
//! ```ignore
//! use nflash_core::chip::parts::MX25L3233F;
//! use nflash_core::flash::FlashDriver;
//! use nflash_core::layer::LayerDescriptor;
//! use nflash_core::transport::Transport;
//!
//! fn store<T: Transport>(bus: T) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut flash = FlashDriver::new(&MX25L3233F.chip, &MX25L3233F.opcodes, bus);
//!     let mut settings = flash.layer(LayerDescriptor::new(0, 0x1_0000))?;
//!     settings.write(0, b"hello")?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod chip;
pub mod error;
pub mod flash;
pub mod layer;
pub mod spi;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use error::{DriverError, LayerError, LayoutError, Result};
