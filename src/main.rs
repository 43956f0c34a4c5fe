//! nflash - SPI-NOR flash window tool
//!
//! Drives the nflash-core flash driver and memory layer against an
//! emulated chip whose contents live in an image file. Windows are named in
//! a TOML window table; every window command goes through a memory layer,
//! so erase-before-write, page splitting and erase granularity behave
//! exactly as they would on hardware.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use error::CliError;
use nflash_core::chip::{find_part, parts, Part, PARTS};
use nflash_core::flash::{FlashDriver, PollLimit};
use nflash_core::layer::{LayerDescriptor, WindowTable};
use nflash_dummy::EmulatedChip;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let table = match &cli.layout {
        Some(path) => {
            let table = WindowTable::from_toml_file(path)?;
            log::info!("Loaded {} windows from {:?}", table.windows.len(), path);
            Some(table)
        }
        None => None,
    };

    let part = resolve_part(cli.chip.as_deref(), table.as_ref())?;
    let chip = part.chip.with_fast_write(cli.fast_write);
    chip.validate()?;
    if let Some(table) = &table {
        table.validate(&chip)?;
    }

    let poll_limit = match cli.max_polls {
        None => PollLimit::default(),
        Some(0) => PollLimit::Unbounded,
        Some(n) => PollLimit::Polls(n),
    };

    let mut emulated = EmulatedChip::open_image(part, &cli.image)?;
    let result = {
        let flash =
            FlashDriver::new(&chip, &part.opcodes, &mut emulated).with_poll_limit(poll_limit);
        run_command(&cli.command, table.as_ref(), part, flash)
    };

    persist(&emulated, &cli.image, cli.command.is_mutating(), result)
}

/// Dispatch one subcommand against the driver
fn run_command(
    command: &Commands,
    table: Option<&WindowTable>,
    part: &'static Part,
    mut flash: FlashDriver<'_, &mut EmulatedChip>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Info => commands::cmd_info(&mut flash, part),
        Commands::Windows => commands::cmd_windows(table.ok_or(CliError::NoLayout)?, flash.chip()),
        Commands::Read {
            target,
            length,
            output,
        } => {
            let window = find_window(table, &target.window)?;
            commands::window::cmd_read(
                &mut flash,
                window,
                target.offset,
                *length,
                output.as_deref(),
            )
        }
        Commands::Write { target, input } => {
            let window = find_window(table, &target.window)?;
            commands::window::cmd_write(&mut flash, window, target.offset, input)
        }
        Commands::Change { target, data } => {
            let window = find_window(table, &target.window)?;
            commands::window::cmd_change(&mut flash, window, target.offset, data)
        }
        Commands::Erase { window: name } => {
            let window = find_window(table, name)?;
            commands::window::cmd_erase(&mut flash, window)
        }
        Commands::ChipErase => commands::window::cmd_chip_erase(&mut flash),
    }
}

/// Save the image after a mutating command, then hand back its result
///
/// A command that fails partway has still changed the chip, so the image
/// is written either way.
fn persist(
    emulated: &EmulatedChip,
    image: &Path,
    mutating: bool,
    result: Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    if mutating {
        if let Err(e) = &result {
            log::warn!("Command failed, keeping the changes made so far: {}", e);
        }
        emulated.save_image(image)?;
        log::debug!("Saved image to {:?}", image);
    }
    result
}

/// Pick the chip from --chip, else from the window table, else the default
fn resolve_part(
    name: Option<&str>,
    table: Option<&WindowTable>,
) -> Result<&'static Part, Box<dyn std::error::Error>> {
    let from_table = match table {
        Some(table) => table.part()?,
        None => None,
    };

    let part = match name {
        Some(name) => find_part(name).ok_or_else(|| {
            let known: Vec<&str> = PARTS.iter().map(|p| p.name).collect();
            CliError::UnknownChip(name.to_string(), known.join(", "))
        })?,
        None => from_table.unwrap_or(&parts::MX25L3233F),
    };

    if let Some(listed) = from_table {
        if listed.name != part.name {
            log::warn!(
                "Window table was written for {}, using {}",
                listed.name,
                part.name
            );
        }
    }

    log::debug!("Using {} {}", part.vendor, part.name);
    Ok(part)
}

/// Look up a window by name
fn find_window(table: Option<&WindowTable>, name: &str) -> Result<LayerDescriptor, CliError> {
    let table = table.ok_or(CliError::NoLayout)?;
    table
        .descriptor(name)
        .map_err(|_| CliError::UnknownWindow(name.to_string()))
}
