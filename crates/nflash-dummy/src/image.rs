//! Flash image files backing an emulated chip

use std::fs;
use std::io;
use std::path::Path;

use nflash_core::chip::Part;

use crate::EmulatedChip;

/// Errors loading or saving a flash image
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Reading or writing the file failed
    #[error("image I/O error: {0}")]
    Io(#[from] io::Error),
    /// The file does not fit in the chip
    #[error("image is {actual} bytes but the chip holds {expected}")]
    TooLarge {
        /// Chip volume
        expected: usize,
        /// File size
        actual: usize,
    },
}

impl EmulatedChip {
    /// Replace the flash contents with a file
    ///
    /// A file shorter than the chip leaves the rest erased.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let image = fs::read(path)?;
        if image.len() > self.data.len() {
            return Err(ImageError::TooLarge {
                expected: self.data.len(),
                actual: image.len(),
            });
        }
        self.data.fill(0xFF);
        self.data[..image.len()].copy_from_slice(&image);
        Ok(())
    }

    /// Emulate `part` backed by `path`, starting erased if the file does
    /// not exist yet
    pub fn open_image(part: &Part, path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let mut chip = Self::for_part(part);
        if path.exists() {
            chip.load_image(path)?;
        } else {
            log::info!("{} does not exist, starting with an erased chip", path.display());
        }
        Ok(chip)
    }

    /// Write the flash contents to a file
    pub fn save_image(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        fs::write(path, &self.data)?;
        Ok(())
    }
}
