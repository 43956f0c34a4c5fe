//! SPI-NOR protocol types
//!
//! This module provides the per-part opcode table, the standard JEDEC
//! opcode values, address encoding and the status register layout.

mod address;
pub mod opcodes;
mod status;

pub use address::{encode_header, Address, ADDRESS_BYTES, FRAME_HEADER_LEN};
pub use opcodes::OpcodeTable;
pub use status::Status;
