//! CLI error types

use thiserror::Error;

/// Errors raised by the command line front end itself
#[derive(Debug, Error)]
pub enum CliError {
    /// A window command was given without a window table
    #[error("--layout is required for window commands")]
    NoLayout,
    /// The chip model is not in the catalogue
    #[error("unknown chip model: {0} (known: {1})")]
    UnknownChip(String, String),
    /// The named window is not in the table
    #[error("window '{0}' not found in the window table")]
    UnknownWindow(String),
}
