//! Named window tables

use alloc::string::String;
use alloc::vec::Vec;

use super::types::LayerDescriptor;
use crate::chip::{find_part, ChipDescriptor, Part};
use crate::error::LayoutError;

/// A named window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Window name
    pub name: String,
    /// Physical start address
    pub start: u32,
    /// Size in bytes
    pub size: u32,
}

impl Window {
    /// Create a new window
    pub fn new(name: impl Into<String>, start: u32, size: u32) -> Self {
        Self {
            name: name.into(),
            start,
            size,
        }
    }

    /// The descriptor for this window
    pub fn descriptor(&self) -> LayerDescriptor {
        LayerDescriptor::new(self.start, self.size)
    }
}

/// A set of named windows over one chip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowTable {
    /// Chip model the table was written for, if named
    pub chip: Option<String>,
    /// Windows, in file order until sorted
    pub windows: Vec<Window>,
}

impl WindowTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window
    pub fn add(&mut self, window: Window) {
        self.windows.push(window);
    }

    /// Sort windows by start address
    pub fn sort_by_address(&mut self) {
        self.windows.sort_by_key(|w| w.start);
    }

    /// Find a window by name
    pub fn find(&self, name: &str) -> Option<&Window> {
        self.windows.iter().find(|w| w.name == name)
    }

    /// Descriptor of the named window
    pub fn descriptor(&self, name: &str) -> Result<LayerDescriptor, LayoutError> {
        self.find(name)
            .map(Window::descriptor)
            .ok_or(LayoutError::WindowNotFound)
    }

    /// Catalogue entry for the chip model named in the table
    pub fn part(&self) -> Result<Option<&'static Part>, LayoutError> {
        match &self.chip {
            Some(model) => find_part(model).map(Some).ok_or(LayoutError::UnknownChip),
            None => Ok(None),
        }
    }

    /// Check every window against the chip and against each other
    pub fn validate(&self, chip: &ChipDescriptor) -> Result<(), LayoutError> {
        for window in &self.windows {
            window.descriptor().validate(chip)?;
        }

        for (i, a) in self.windows.iter().enumerate() {
            for b in &self.windows[i + 1..] {
                if a.name == b.name {
                    return Err(LayoutError::DuplicateName);
                }
                if a.descriptor().overlaps(&b.descriptor()) {
                    return Err(LayoutError::Overlapping);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::parts::MX25L3233F;

    fn table() -> WindowTable {
        let mut table = WindowTable::new();
        table.add(Window::new("log", 0x1_0000, 0x2_0000));
        table.add(Window::new("settings", 0, 0x1000));
        table
    }

    #[test]
    fn test_validate_ok() {
        assert!(table().validate(&MX25L3233F.chip).is_ok());
    }

    #[test]
    fn test_overlap_and_duplicates() {
        let mut t = table();
        t.add(Window::new("boot", 0x2_0000, 0x1000));
        assert_eq!(t.validate(&MX25L3233F.chip), Err(LayoutError::Overlapping));

        let mut t = table();
        t.add(Window::new("log", 0x20_0000, 0x1000));
        assert_eq!(t.validate(&MX25L3233F.chip), Err(LayoutError::DuplicateName));
    }

    #[test]
    fn test_descriptor_lookup() {
        let t = table();
        assert_eq!(
            t.descriptor("log"),
            Ok(LayerDescriptor::new(0x1_0000, 0x2_0000))
        );
        assert_eq!(t.descriptor("nvram"), Err(LayoutError::WindowNotFound));
    }

    #[test]
    fn test_sort_by_address() {
        let mut t = table();
        t.sort_by_address();
        assert_eq!(t.windows[0].name, "settings");
    }

    #[test]
    fn test_part() {
        let mut t = table();
        assert_eq!(t.part(), Ok(None));
        t.chip = Some("mx25l3233f".into());
        assert_eq!(t.part().map(|p| p.map(|p| p.name)), Ok(Some("MX25L3233F")));
        t.chip = Some("unknown".into());
        assert_eq!(t.part(), Err(LayoutError::UnknownChip));
    }
}
