//! Tile-scan extraction engine.
//!
//! An [`ExtractionEngine`] walks every tile of a [`TileRangePlan`], decodes
//! it through a [`TileArchive`], and forwards the points and ways that
//! survive classification, text filtering and deduplication to an
//! [`AnnotationStore`] and a [`TrackStore`].
//!
//! Point write failures are logged and counted but never stop the scan. A
//! failed track write is rolled back and ends the run, as does a tile that
//! cannot be decoded. Whatever happens, the archive reader is closed before
//! the outcome is returned.
//!
//! [`TileRangePlan`]: crate::TileRangePlan
//! [`TileArchive`]: crate::TileArchive
//! [`AnnotationStore`]: crate::AnnotationStore
//! [`TrackStore`]: crate::TrackStore

mod error;
mod options;
mod outcome;
mod scan;
mod worker;

pub use error::ExtractionError;
pub use options::{CancelFlag, ExtractionOptions};
pub use outcome::{ExtractionOutcome, ExtractionReport, ExtractionState, ProgressTick};
pub use scan::{ExtractionEngine, TRACK_POINT_INTERVAL_MS};
pub use worker::{ExtractionHandle, spawn_extraction};
