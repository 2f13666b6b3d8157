//! Error types emitted by the mapsift CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mapsift_core::{BoundingBox, ExtractionError};
use mapsift_data::StoreOpenError;
use thiserror::Error;

/// Errors emitted by the mapsift CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The bounding box edges are out of order.
    #[error("bounding box {bounds:?} must have north >= south and east >= west")]
    InvalidBounds { bounds: BoundingBox },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening or initialising the output database failed.
    #[error("failed to open output database at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: StoreOpenError,
    },
    /// The extraction worker could not be started.
    #[error("failed to start extraction: {0}")]
    Spawn(ExtractionError),
    /// The extraction ended with a fatal error.
    #[error("ERROR: {0}")]
    Extraction(ExtractionError),
}
