//! Command-line interface for extracting map annotations from tile archives.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod extract;

pub use error::CliError;

use extract::{ExtractArgs, run_extract};

pub(crate) const ARG_ARCHIVE: &str = "archive";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_NORTH: &str = "north";
pub(crate) const ARG_SOUTH: &str = "south";
pub(crate) const ARG_EAST: &str = "east";
pub(crate) const ARG_WEST: &str = "west";
pub(crate) const ARG_ZOOM: &str = "zoom";
pub(crate) const ARG_POIS: &str = "pois";
pub(crate) const ARG_WAYS: &str = "ways";
pub(crate) const ARG_CONTOURS: &str = "contours";
pub(crate) const ARG_FILTER: &str = "filter";
pub(crate) const ARG_EXCLUDE: &str = "exclude";
pub(crate) const ENV_ARCHIVE: &str = "MAPSIFT_CMDS_EXTRACT_ARCHIVE";
pub(crate) const ENV_OUTPUT: &str = "MAPSIFT_CMDS_EXTRACT_OUTPUT";
pub(crate) const ENV_NORTH: &str = "MAPSIFT_CMDS_EXTRACT_NORTH";
pub(crate) const ENV_SOUTH: &str = "MAPSIFT_CMDS_EXTRACT_SOUTH";
pub(crate) const ENV_EAST: &str = "MAPSIFT_CMDS_EXTRACT_EAST";
pub(crate) const ENV_WEST: &str = "MAPSIFT_CMDS_EXTRACT_WEST";
pub(crate) const ENV_ZOOM: &str = "MAPSIFT_CMDS_EXTRACT_ZOOM";

/// Run the mapsift CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments or configuration are invalid, when
/// the archive or output database cannot be opened, or when the extraction
/// ends with a fatal error.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Extract(args) => {
            run_extract(args)?;
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "mapsift",
    about = "Extract points of interest and roads from offline map tiles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a tile archive over an area and store notes and tracks.
    Extract(ExtractArgs),
}

#[cfg(test)]
mod tests;
