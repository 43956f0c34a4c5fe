//! Info command implementation

use nflash_core::chip::{EraseKind, Part};
use nflash_core::flash::{FlashDriver, PollLimit};
use nflash_core::spi::Status;
use nflash_core::transport::Transport;

use super::format_size;

/// Print the chip description and what the chip reports about itself
pub fn cmd_info<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
    part: &Part,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = flash.read_chip_id()?;
    let status = flash.read_status()?;
    let config = flash.read_config()?;
    let chip = flash.chip();

    println!("Flash Chip Information");
    println!("======================");
    println!();
    println!("Vendor:          {}", part.vendor);
    println!("Name:            {}", part.name);
    println!("Chip ID:         {}", id);
    let expected = &part.id[..chip.id_length as usize];
    if id.as_bytes() != expected {
        log::warn!(
            "Chip ID does not match {} (expected {:02X?})",
            part.name,
            expected
        );
    }
    println!(
        "Size:            {} bytes ({})",
        chip.volume,
        format_size(chip.volume)
    );
    println!("Page size:       {} bytes", chip.page_size);
    println!("Sector size:     {} bytes", chip.sector_size);
    println!(
        "Fast write:      {}",
        if chip.fast_write { "enabled" } else { "disabled" }
    );
    println!("Page poll:       {} us", chip.page_write_timeout_us);
    for kind in [EraseKind::Sector, EraseKind::Block32, EraseKind::Block64, EraseKind::Chip] {
        println!(
            "{:<16} {} us per poll",
            format!("{} erase:", kind),
            chip.erase_poll_interval_us(kind)
        );
    }
    match flash.poll_limit() {
        PollLimit::Unbounded => println!("Poll limit:      none"),
        PollLimit::Polls(n) => println!("Poll limit:      {} polls", n),
    }
    println!();
    println!("Status:          0x{:02X} {:?}", status.bits(), status);
    if status.intersects(Status::BP0 | Status::BP1 | Status::BP2 | Status::BP3) {
        println!("                 block protection is active");
    }
    println!("Config:          0x{:02X}", config);

    Ok(())
}
