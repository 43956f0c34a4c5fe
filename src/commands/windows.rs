//! Windows command implementation

use nflash_core::chip::ChipDescriptor;
use nflash_core::layer::WindowTable;

use super::format_size;

/// List the windows of a table with the erase unit `erase` would use
pub fn cmd_windows(
    table: &WindowTable,
    chip: &ChipDescriptor,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(model) = &table.chip {
        println!("Chip: {}", model);
        println!();
    }
    println!(
        "{:<16} {:>10} {:>10} {:>10} {:>8}",
        "Name", "Start", "End", "Size", "Erase"
    );
    println!("{}", "-".repeat(58));

    for window in &table.windows {
        let desc = window.descriptor();
        let unit = chip.erase_size(desc.erase_kind(chip, desc.volume));
        println!(
            "{:<16} 0x{:08X} 0x{:08X} {:>10} {:>8}",
            window.name,
            desc.start,
            desc.end() - 1,
            format_size(desc.volume),
            format_size(unit)
        );
    }
    Ok(())
}
