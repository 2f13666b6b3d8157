use std::fmt;

use crate::DedupIndex;

use super::ExtractionError;

/// Lifecycle of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    /// Created but not yet running.
    Idle,
    /// Walking tiles.
    Scanning,
    /// Every tile was processed.
    Completed,
    /// A fatal error ended the run.
    Failed,
    /// Neither points nor ways were requested, so the archive was never
    /// opened.
    NotStarted,
}

/// Progress after one tile, counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTick {
    /// Tiles processed so far.
    pub current: u64,
    /// Tiles planned for the whole run.
    pub total: u64,
}

impl fmt::Display for ProgressTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}/{}", self.current, self.total)
    }
}

/// Counters gathered while scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Tiles read and processed.
    pub tiles_scanned: u64,
    /// Notes stored.
    pub notes_written: u64,
    /// Points whose note could not be stored.
    pub notes_failed: u64,
    /// Points and ways already emitted earlier in the run.
    pub duplicates_skipped: u64,
    /// Points rejected by the text filter.
    pub points_filtered: u64,
    /// Points decoded from a tile but lying outside the bounding box.
    pub points_outside: u64,
    /// Tracks committed.
    pub tracks_written: u64,
    /// Points across every committed track.
    pub track_points_written: u64,
    /// Road or contour ways without any node.
    pub ways_skipped: u64,
}

/// Terminal result of a run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    /// State the run ended in.
    pub state: ExtractionState,
    /// Set exactly when `state` is [`ExtractionState::Failed`].
    pub error: Option<ExtractionError>,
    /// Counters up to the point the run ended.
    pub report: ExtractionReport,
    /// Keys emitted by this run, for seeding a later one.
    pub dedup: DedupIndex,
}

impl ExtractionOutcome {
    /// Empty on success, otherwise `ERROR: ` followed by the error.
    ///
    /// # Examples
    /// ```
    /// use mapsift_core::{DedupIndex, ExtractionError, ExtractionOutcome, ExtractionReport};
    ///
    /// let failed = ExtractionOutcome::failed(
    ///     ExtractionError::Cancelled { tiles: 2 },
    ///     ExtractionReport::default(),
    ///     DedupIndex::new(),
    /// );
    /// assert_eq!(failed.message(), "ERROR: extraction cancelled after 2 tiles");
    /// ```
    #[must_use]
    pub fn message(&self) -> String {
        self.error
            .as_ref()
            .map_or_else(String::new, |err| format!("ERROR: {err}"))
    }

    /// Whether the run ended without a fatal error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Outcome of a run that scanned every planned tile.
    #[must_use]
    pub const fn completed(report: ExtractionReport, dedup: DedupIndex) -> Self {
        Self {
            state: ExtractionState::Completed,
            error: None,
            report,
            dedup,
        }
    }

    /// Outcome of a run ended by `error`.
    #[must_use]
    pub const fn failed(error: ExtractionError, report: ExtractionReport, dedup: DedupIndex) -> Self {
        Self {
            state: ExtractionState::Failed,
            error: Some(error),
            report,
            dedup,
        }
    }
}
