//! Window read / write / change / erase commands

use std::fs;
use std::path::Path;

use nflash_core::flash::FlashDriver;
use nflash_core::layer::LayerDescriptor;
use nflash_core::transport::Transport;
use nflash_core::LayerError;

use super::{format_size, hexdump};

/// Read `length` bytes at `offset` of a window, to a file or as a hex dump
pub fn cmd_read<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
    window: LayerDescriptor,
    offset: u32,
    length: u32,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut layer = flash.layer(window)?;
    if offset >= layer.volume() {
        return Err(LayerError::AddressOutOfRange.into());
    }
    if length == 0 || length > layer.volume() - offset {
        return Err(LayerError::InvalidLength.into());
    }
    let mut data = vec![0u8; length as usize];
    layer.read(offset, &mut data)?;

    match output {
        Some(path) => {
            fs::write(path, &data)?;
            println!("Wrote {} bytes to {:?}", data.len(), path);
        }
        None => print!("{}", hexdump(offset, &data)),
    }
    Ok(())
}

/// Write a file at `offset` of a window
pub fn cmd_write<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
    window: LayerDescriptor,
    offset: u32,
    input: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    log::info!("Writing {} bytes at window offset 0x{:X}", data.len(), offset);

    let mut layer = flash.layer(window)?;
    layer.write(offset, &data)?;

    println!("Wrote {} from {:?}", format_size(data.len() as u32), input);
    Ok(())
}

/// Program bytes at `offset` of a window without erasing
pub fn cmd_change<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
    window: LayerDescriptor,
    offset: u32,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut layer = flash.layer(window)?;
    layer.change(offset, data)?;

    // Programming only clears bits, so show what actually landed
    let mut readback = vec![0u8; data.len()];
    layer.read(offset, &mut readback)?;
    if readback != data {
        log::warn!("Some bits could not be set; erase the window first to write 1s");
    }
    print!("{}", hexdump(offset, &readback));
    Ok(())
}

/// Erase a whole window
pub fn cmd_erase<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
    window: LayerDescriptor,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut layer = flash.layer(window)?;
    layer.erase_region()?;
    println!(
        "Erased {} at 0x{:08X}",
        format_size(window.volume),
        window.start
    );
    Ok(())
}

/// Erase the whole chip
pub fn cmd_chip_erase<T: Transport>(
    flash: &mut FlashDriver<'_, T>,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Erasing entire chip...");
    flash.chip_erase()?;
    println!("Chip erased");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nflash_core::chip::parts::MX25L3233F;
    use nflash_dummy::EmulatedChip;

    #[test]
    fn test_write_then_change() {
        let mut emulated = EmulatedChip::for_part(&MX25L3233F);
        let input = std::env::temp_dir().join(format!("nflash-cli-{}.bin", std::process::id()));
        fs::write(&input, [0xF0u8, 0xFF]).unwrap();

        {
            let mut flash = FlashDriver::new(&MX25L3233F.chip, &MX25L3233F.opcodes, &mut emulated);
            let window = LayerDescriptor::new(0x1000, 0x1000);
            cmd_write(&mut flash, window, 0x20, &input).unwrap();
            cmd_change(&mut flash, window, 0x20, &[0x0F, 0x0F]).unwrap();
            assert!(cmd_read(&mut flash, window, 0x1000, 1, None).is_err());
        }
        fs::remove_file(&input).unwrap();

        assert_eq!(&emulated.data()[0x1020..0x1022], &[0x00, 0x0F]);
    }

    #[test]
    fn test_read_length_checked_before_buffer() {
        let mut emulated = EmulatedChip::for_part(&MX25L3233F);
        let mut flash = FlashDriver::new(&MX25L3233F.chip, &MX25L3233F.opcodes, &mut emulated);
        let window = LayerDescriptor::new(0x1000, 0x1000);

        let err = cmd_read(&mut flash, window, 0x10, u32::MAX, None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LayerError>(),
            Some(&LayerError::InvalidLength)
        );
        let err = cmd_read(&mut flash, window, 0x1000, 1, None).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LayerError>(),
            Some(&LayerError::AddressOutOfRange)
        );
        assert!(flash.transport().operations().is_empty());
    }

    #[test]
    fn test_erase_window() {
        let mut emulated = EmulatedChip::for_part(&MX25L3233F);
        emulated.data_mut().fill(0);
        {
            let mut flash = FlashDriver::new(&MX25L3233F.chip, &MX25L3233F.opcodes, &mut emulated);
            cmd_erase(&mut flash, LayerDescriptor::new(0x2_0000, 0x1_0000)).unwrap();
        }
        assert!(emulated.data()[0x2_0000..0x3_0000].iter().all(|&b| b == 0xFF));
        assert_eq!(emulated.data()[0x3_0000], 0);
    }
}
