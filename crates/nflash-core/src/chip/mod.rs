//! Flash chip descriptors
//!
//! This module provides types for describing the geometry and timing of a
//! flash part, and a small catalogue of known parts.

pub mod parts;
mod types;

pub use parts::{find_part, Part, PARTS};
pub use types::*;
