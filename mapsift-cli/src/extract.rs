//! Extract command implementation for the mapsift CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use mapsift_core::{
    BoundingBox, ExtractionEngine, ExtractionOptions, ExtractionReport, ExtractionState,
    spawn_extraction,
};
use mapsift_data::{MbtilesArchive, SqliteNoteStore, SqliteTrackStore};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ARCHIVE, ARG_CONTOURS, ARG_EAST, ARG_EXCLUDE, ARG_FILTER, ARG_NORTH, ARG_OUTPUT,
    ARG_POIS, ARG_SOUTH, ARG_WAYS, ARG_WEST, ARG_ZOOM, CliError, ENV_ARCHIVE, ENV_EAST,
    ENV_NORTH, ENV_OUTPUT, ENV_SOUTH, ENV_WEST, ENV_ZOOM,
};

/// CLI arguments for the `extract` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Scan an MBTiles archive over a bounding box, starting at a \
                 base zoom level and descending four more levels, and store \
                 points of interest as notes and roads as tracks in a SQLite \
                 database. Options can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Extract notes and tracks from a tile archive",
    allow_negative_numbers = true
)]
#[ortho_config(prefix = "MAPSIFT")]
pub(crate) struct ExtractArgs {
    /// Path to the MBTiles archive to scan.
    #[arg(long = ARG_ARCHIVE, value_name = "path")]
    #[serde(default)]
    pub(crate) archive: Option<Utf8PathBuf>,
    /// Path to the SQLite database receiving notes and tracks.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Northern edge of the area, in degrees of latitude.
    #[arg(long = ARG_NORTH, value_name = "degrees")]
    #[serde(default)]
    pub(crate) north: Option<f64>,
    /// Southern edge of the area, in degrees of latitude.
    #[arg(long = ARG_SOUTH, value_name = "degrees")]
    #[serde(default)]
    pub(crate) south: Option<f64>,
    /// Eastern edge of the area, in degrees of longitude.
    #[arg(long = ARG_EAST, value_name = "degrees")]
    #[serde(default)]
    pub(crate) east: Option<f64>,
    /// Western edge of the area, in degrees of longitude.
    #[arg(long = ARG_WEST, value_name = "degrees")]
    #[serde(default)]
    pub(crate) west: Option<f64>,
    /// Base zoom level of the scan (at most 22).
    #[arg(long = ARG_ZOOM, value_name = "level")]
    #[serde(default)]
    pub(crate) zoom: Option<u8>,
    /// Store points of interest as notes.
    #[arg(
        long = ARG_POIS,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) pois: Option<bool>,
    /// Store roads as tracks.
    #[arg(
        long = ARG_WAYS,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) ways: Option<bool>,
    /// Also store contour lines as tracks.
    #[arg(
        long = ARG_CONTOURS,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) contours: Option<bool>,
    /// Keep only points whose description contains this text.
    #[arg(long = ARG_FILTER, value_name = "text")]
    #[serde(default)]
    pub(crate) filter: Option<String>,
    /// Drop points matching `--filter` instead of keeping them.
    #[arg(
        long = ARG_EXCLUDE,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) exclude: Option<bool>,
}

impl ExtractArgs {
    pub(crate) fn into_config(self) -> Result<ExtractConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ExtractConfig::try_from(merged)
    }
}

/// Resolved `extract` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExtractConfig {
    /// Archive scanned for tiles.
    pub(crate) archive: Utf8PathBuf,
    /// Database receiving notes and tracks.
    pub(crate) output: Utf8PathBuf,
    pub(crate) options: ExtractionOptions,
}

impl ExtractConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.archive, ARG_ARCHIVE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match mapsift_fs::is_regular_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn require<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

impl TryFrom<ExtractArgs> for ExtractConfig {
    type Error = CliError;

    fn try_from(args: ExtractArgs) -> Result<Self, Self::Error> {
        let archive = require(args.archive, ARG_ARCHIVE, ENV_ARCHIVE)?;
        let output = require(args.output, ARG_OUTPUT, ENV_OUTPUT)?;
        let bounds = BoundingBox::new(
            require(args.north, ARG_NORTH, ENV_NORTH)?,
            require(args.south, ARG_SOUTH, ENV_SOUTH)?,
            require(args.east, ARG_EAST, ENV_EAST)?,
            require(args.west, ARG_WEST, ENV_WEST)?,
        );
        if !bounds.is_well_formed() {
            return Err(CliError::InvalidBounds { bounds });
        }
        let zoom = require(args.zoom, ARG_ZOOM, ENV_ZOOM)?;

        Ok(Self {
            archive,
            output,
            options: ExtractionOptions {
                bounds,
                zoom,
                pois: args.pois.unwrap_or(false),
                ways: args.ways.unwrap_or(false),
                contours: args.contours.unwrap_or(false),
                filter_text: args.filter.unwrap_or_default(),
                filter_excludes: args.exclude.unwrap_or(false),
            },
        })
    }
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<ExtractionReport, CliError> {
    let config = resolve_extract_config(args)?;
    config.validate_sources()?;
    execute_extract(&config)
}

pub(crate) fn resolve_extract_config(args: ExtractArgs) -> Result<ExtractConfig, CliError> {
    args.into_config()
}

/// Run the engine on a worker thread and log its progress until it ends.
pub(crate) fn execute_extract(config: &ExtractConfig) -> Result<ExtractionReport, CliError> {
    let open_error = |source| CliError::OpenStore {
        path: config.output.clone(),
        source,
    };
    let notes = SqliteNoteStore::open(&config.output).map_err(open_error)?;
    let tracks = SqliteTrackStore::open(&config.output).map_err(open_error)?;
    let archive = MbtilesArchive::new(config.archive.clone());

    info!("extracting {} into {}", config.archive, config.output);
    let engine = ExtractionEngine::new(config.options.clone());
    let handle =
        spawn_extraction(engine, archive, notes, tracks).map_err(CliError::Spawn)?;
    for tick in handle.progress() {
        info!("{tick}");
    }

    let outcome = handle.wait();
    if outcome.state == ExtractionState::NotStarted {
        warn!("nothing extracted: pass --{ARG_POIS} and/or --{ARG_WAYS}");
    }
    log_report(&outcome.report);
    match outcome.error {
        Some(err) => Err(CliError::Extraction(err)),
        None => Ok(outcome.report),
    }
}

fn log_report(report: &ExtractionReport) {
    info!(
        "{} tiles scanned; {} notes written, {} failed; {} tracks written with {} points",
        report.tiles_scanned,
        report.notes_written,
        report.notes_failed,
        report.tracks_written,
        report.track_points_written
    );
    info!(
        "skipped {} duplicates, {} filtered points, {} points outside the area, {} empty ways",
        report.duplicates_skipped,
        report.points_filtered,
        report.points_outside,
        report.ways_skipped
    );
}
