use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info, warn};

use crate::classify::{ClassifiedWay, UNKNOWN_ELEVATION, classify_point, classify_way};
use crate::{
    AnnotationStore, ArchiveSession, DedupIndex, NewNote, NewTrack, RawPoint, RawWay, TextFilter,
    TileArchive, TileRangePlan, TrackPoint, TrackStore, TrackTransaction,
};

use super::{
    CancelFlag, ExtractionError, ExtractionOptions, ExtractionOutcome, ExtractionReport,
    ExtractionState, ProgressTick,
};

/// Gap between the synthetic timestamps of consecutive track points.
pub const TRACK_POINT_INTERVAL_MS: i64 = 1_000;

/// Runs one extraction over a tile archive.
///
/// # Examples
/// ```
/// use mapsift_core::test_support::{MemoryAnnotationStore, MemoryArchive, MemoryTrackStore};
/// use mapsift_core::{BoundingBox, ExtractionEngine, ExtractionOptions};
///
/// let bounds = BoundingBox::new(45.0, 44.7, 10.3, 10.0);
/// let engine = ExtractionEngine::new(ExtractionOptions::points(bounds, 10));
/// let mut notes = MemoryAnnotationStore::default();
/// let mut tracks = MemoryTrackStore::default();
/// let mut ticks = 0;
///
/// let outcome = engine.run(&MemoryArchive::default(), &mut notes, &mut tracks, |_| ticks += 1);
/// assert_eq!(outcome.message(), "");
/// assert_eq!(ticks, outcome.report.tiles_scanned);
/// ```
#[derive(Debug)]
pub struct ExtractionEngine {
    options: ExtractionOptions,
    timestamp: i64,
    dedup: DedupIndex,
    cancel: CancelFlag,
}

impl ExtractionEngine {
    /// Engine stamping every note and track with the current time.
    #[must_use]
    pub fn new(options: ExtractionOptions) -> Self {
        Self::with_timestamp(options, now_millis())
    }

    /// Engine stamping every note and track with `timestamp` (milliseconds
    /// since the Unix epoch).
    #[must_use]
    pub fn with_timestamp(options: ExtractionOptions, timestamp: i64) -> Self {
        Self {
            options,
            timestamp,
            dedup: DedupIndex::new(),
            cancel: CancelFlag::new(),
        }
    }

    /// Start from keys emitted by an earlier run so they are not stored again.
    #[must_use]
    pub fn with_dedup_index(mut self, dedup: DedupIndex) -> Self {
        self.dedup = dedup;
        self
    }

    /// Stop the scan when `cancel` is raised.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Options the engine was built with.
    #[must_use]
    pub const fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Flag that cancels this engine's run when raised.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Scan every tile, calling `progress` once per processed tile.
    ///
    /// The archive is only opened when points or ways are requested. Once
    /// opened it is closed before this returns, on success and failure
    /// alike.
    pub fn run<A, N, T, P>(
        self,
        archive: &A,
        notes: &mut N,
        tracks: &mut T,
        mut progress: P,
    ) -> ExtractionOutcome
    where
        A: TileArchive,
        N: AnnotationStore,
        T: TrackStore,
        P: FnMut(ProgressTick),
    {
        let Self {
            options,
            timestamp,
            dedup,
            cancel,
        } = self;

        if !options.requests_anything() {
            info!("neither points nor ways requested; nothing to extract");
            return ExtractionOutcome {
                state: ExtractionState::NotStarted,
                error: None,
                report: ExtractionReport::default(),
                dedup,
            };
        }

        let mut scan = Scan {
            filter: TextFilter::new(&options.filter_text, options.filter_excludes),
            options: &options,
            timestamp,
            cancel: &cancel,
            dedup,
            report: ExtractionReport::default(),
            state: ExtractionState::Idle,
        };
        let result = scan.execute(archive, notes, tracks, &mut progress);
        scan.transition(if result.is_ok() {
            ExtractionState::Completed
        } else {
            ExtractionState::Failed
        });
        let Scan { dedup, report, .. } = scan;

        match result {
            Ok(()) => {
                info!(
                    "extraction completed: {} tiles, {} notes, {} tracks",
                    report.tiles_scanned, report.notes_written, report.tracks_written
                );
                ExtractionOutcome::completed(report, dedup)
            }
            Err(err) => {
                error!("extraction failed after {} tiles: {err}", report.tiles_scanned);
                ExtractionOutcome::failed(err, report, dedup)
            }
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

/// Mutable state of a single run.
struct Scan<'run> {
    options: &'run ExtractionOptions,
    filter: TextFilter,
    timestamp: i64,
    cancel: &'run CancelFlag,
    dedup: DedupIndex,
    report: ExtractionReport,
    state: ExtractionState,
}

impl Scan<'_> {
    fn transition(&mut self, next: ExtractionState) {
        debug!("extraction state {:?} -> {next:?}", self.state);
        self.state = next;
    }

    fn execute<A, N, T, P>(
        &mut self,
        archive: &A,
        notes: &mut N,
        tracks: &mut T,
        progress: &mut P,
    ) -> Result<(), ExtractionError>
    where
        A: TileArchive,
        N: AnnotationStore,
        T: TrackStore,
        P: FnMut(ProgressTick),
    {
        let plan = TileRangePlan::new(self.options.bounds, self.options.zoom);
        let total = plan.total_tiles();
        let mut session = ArchiveSession::open(archive)?;
        self.transition(ExtractionState::Scanning);
        info!(
            "scanning {total} tiles over {} zoom levels from zoom {}",
            plan.ranges().len(),
            self.options.zoom
        );

        let mut current = 0_u64;
        for range in plan.ranges() {
            debug!(
                "zoom {}: x {}..={}, y {}..={}",
                range.zoom, range.start_x, range.end_x, range.start_y, range.end_y
            );
            let extract_ways = self.options.ways && range.is_base_level();
            for tile in range.tiles() {
                if self.cancel.is_cancelled() {
                    return Err(ExtractionError::Cancelled { tiles: current });
                }
                let features = session.read_tile(tile)?;
                if self.options.pois {
                    self.extract_points(&features.points, notes);
                }
                if extract_ways {
                    self.extract_ways(&features.ways, tracks)?;
                }
                current += 1;
                self.report.tiles_scanned = current;
                progress(ProgressTick { current, total });
            }
        }
        Ok(())
    }

    fn extract_points<N: AnnotationStore>(&mut self, points: &[RawPoint], notes: &mut N) {
        for point in points {
            // Tiles overhang the bounding box, so their content must be clipped.
            if !self.options.bounds.contains_coord(point.location) {
                self.report.points_outside += 1;
                continue;
            }
            let classified = classify_point(point);
            if !self.filter.matches(&classified.form) {
                self.report.points_filtered += 1;
                continue;
            }
            if !self.dedup.try_add_point(&classified.dedup_key()) {
                self.report.duplicates_skipped += 1;
                continue;
            }
            match notes.add_note(&NewNote::from_point(&classified, self.timestamp)) {
                Ok(_) => self.report.notes_written += 1,
                Err(err) => {
                    error!(
                        "failed to store point {:?} at ({}, {}): {err}",
                        classified.label, classified.location.x, classified.location.y
                    );
                    self.report.notes_failed += 1;
                }
            }
        }
    }

    fn extract_ways<T: TrackStore>(
        &mut self,
        ways: &[RawWay],
        tracks: &mut T,
    ) -> Result<(), ExtractionError> {
        for way in ways {
            let Some(classified) = classify_way(way, self.options.contours) else {
                continue;
            };
            let Some(key) = classified.dedup_key() else {
                warn!("skipping way {:?} without nodes", classified.name);
                self.report.ways_skipped += 1;
                continue;
            };
            if !self.dedup.try_add_way(&key) {
                self.report.duplicates_skipped += 1;
                continue;
            }
            self.write_track(&classified, tracks)?;
        }
        Ok(())
    }

    fn write_track<T: TrackStore>(
        &mut self,
        way: &ClassifiedWay<'_>,
        tracks: &mut T,
    ) -> Result<(), ExtractionError> {
        let header = NewTrack {
            timestamp: self.timestamp,
            name: way.name.clone(),
            width: way.width,
            color: way.color.to_owned(),
            visible: true,
        };
        let track = tracks
            .add_track(&header)
            .map_err(|source| ExtractionError::TrackCreate {
                name: way.name.clone(),
                source,
            })?;
        let track_write = |source| ExtractionError::TrackWrite {
            name: way.name.clone(),
            source,
        };

        let mut transaction = tracks.begin().map_err(track_write)?;
        let mut timestamp = self.timestamp;
        let mut written = 0_u64;
        for node in way.paths.iter().flatten() {
            let location = node.to_degrees();
            let point = TrackPoint {
                lon: location.x,
                lat: location.y,
                elevation: UNKNOWN_ELEVATION,
                timestamp,
            };
            if let Err(source) = transaction.add_track_point(track, &point) {
                if let Err(rollback) = transaction.rollback() {
                    warn!("failed to roll back track {:?}: {rollback}", way.name);
                }
                return Err(track_write(source));
            }
            timestamp = timestamp.saturating_add(TRACK_POINT_INTERVAL_MS);
            written += 1;
        }
        transaction.commit().map_err(track_write)?;

        debug!("stored track {:?} with {written} points", way.name);
        self.report.tracks_written += 1;
        self.report.track_points_written += written;
        Ok(())
    }
}
