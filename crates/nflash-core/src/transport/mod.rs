//! Bus transport abstraction
//!
//! The driver never touches hardware directly. Every bus access goes
//! through a [`Transport`] supplied by the caller: a board SPI peripheral,
//! an embedded-hal bus (feature `embedded-hal`), or an emulated chip in
//! tests.

#[cfg(feature = "embedded-hal")]
mod hal;
mod traits;

#[cfg(feature = "embedded-hal")]
pub use hal::HalTransport;
pub use traits::*;
