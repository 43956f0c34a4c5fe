//! Windowed memory layer
//!
//! A [`MemoryLayer`] exposes a sector-aligned window of the chip as a flat
//! virtual address space starting at zero. Writes erase each sector they
//! start a chunk on and are split at page boundaries; `change` programs in
//! place without erasing.
//!
//! Windows are described by a [`LayerDescriptor`], built in code or, with
//! the `std` feature, loaded from a TOML window table.

mod memory;
#[cfg(feature = "alloc")]
mod table;
#[cfg(feature = "std")]
mod toml;
mod types;

pub use memory::MemoryLayer;
#[cfg(feature = "alloc")]
pub use table::{Window, WindowTable};
#[cfg(feature = "std")]
pub use self::toml::{parse_number, parse_size};
pub use types::LayerDescriptor;
