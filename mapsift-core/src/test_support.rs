//! In-memory archive and store fakes used by unit and behaviour tests.
//!
//! Every fake shares its recorded state behind an `Arc`, so a clone handed
//! to the engine (or moved onto a worker thread) can still be inspected by
//! the test afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    AnnotationStore, ArchiveError, NewNote, NewTrack, NoteId, StoreError, TileArchive, TileCoord,
    TileFeatures, TileReader, TrackId, TrackPoint, TrackStore, TrackTransaction,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Counters recorded by a [`MemoryArchive`] and its readers.
#[derive(Debug, Clone, Default)]
pub struct ArchiveStats(Arc<ArchiveCounters>);

#[derive(Debug, Default)]
struct ArchiveCounters {
    opens: AtomicU64,
    reads: AtomicU64,
    closes: AtomicU64,
    tiles_read: Mutex<Vec<TileCoord>>,
}

impl ArchiveStats {
    #[must_use]
    pub fn opens(&self) -> u64 {
        self.0.opens.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn reads(&self) -> u64 {
        self.0.reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn closes(&self) -> u64 {
        self.0.closes.load(Ordering::SeqCst)
    }

    /// Tiles requested from readers, in request order.
    #[must_use]
    pub fn tiles_read(&self) -> Vec<TileCoord> {
        lock(&self.0.tiles_read).clone()
    }
}

/// Archive serving tiles from a map; unknown tiles decode as empty.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    tiles: Arc<BTreeMap<TileCoord, TileFeatures>>,
    fail_on_read: Option<u64>,
    fail_open: bool,
    stats: ArchiveStats,
}

impl MemoryArchive {
    #[must_use]
    pub fn with_tiles<I>(tiles: I) -> Self
    where
        I: IntoIterator<Item = (TileCoord, TileFeatures)>,
    {
        Self {
            tiles: Arc::new(tiles.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Fail the `read`-th tile decode (1-based) with a decode error.
    #[must_use]
    pub const fn failing_on_read(mut self, read: u64) -> Self {
        self.fail_on_read = Some(read);
        self
    }

    #[must_use]
    pub const fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    #[must_use]
    pub const fn stats(&self) -> &ArchiveStats {
        &self.stats
    }
}

impl TileArchive for MemoryArchive {
    type Reader = MemoryReader;

    fn open(&self) -> Result<Self::Reader, ArchiveError> {
        self.stats.0.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(ArchiveError::open("memory", "archive unavailable"));
        }
        Ok(MemoryReader {
            tiles: Arc::clone(&self.tiles),
            fail_on_read: self.fail_on_read,
            stats: self.stats.clone(),
        })
    }
}

/// Reader handed out by [`MemoryArchive`].
#[derive(Debug)]
pub struct MemoryReader {
    tiles: Arc<BTreeMap<TileCoord, TileFeatures>>,
    fail_on_read: Option<u64>,
    stats: ArchiveStats,
}

impl TileReader for MemoryReader {
    fn read_tile(&mut self, tile: TileCoord) -> Result<TileFeatures, ArchiveError> {
        let read = self.stats.0.reads.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.stats.0.tiles_read).push(tile);
        if self.fail_on_read == Some(read) {
            return Err(ArchiveError::decode(tile, "corrupt tile"));
        }
        Ok(self.tiles.get(&tile).cloned().unwrap_or_default())
    }

    fn close(&mut self) {
        self.stats.0.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct NoteLog {
    notes: Vec<(NoteId, NewNote)>,
    attempts: u64,
    failing_attempts: BTreeSet<u64>,
    last_id: NoteId,
}

/// Annotation store recording notes in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAnnotationStore {
    log: Arc<Mutex<NoteLog>>,
}

impl MemoryAnnotationStore {
    /// Fail the `attempt`-th call to `add_note` (1-based).
    #[must_use]
    pub fn failing_on_attempt(self, attempt: u64) -> Self {
        lock(&self.log).failing_attempts.insert(attempt);
        self
    }

    /// Stored notes in insertion order.
    #[must_use]
    pub fn notes(&self) -> Vec<NewNote> {
        lock(&self.log)
            .notes
            .iter()
            .map(|(_, note)| note.clone())
            .collect()
    }

    /// Calls to `add_note`, successful or not.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        lock(&self.log).attempts
    }
}

impl AnnotationStore for MemoryAnnotationStore {
    fn add_note(&mut self, note: &NewNote) -> Result<NoteId, StoreError> {
        let mut log = lock(&self.log);
        log.attempts += 1;
        if log.failing_attempts.contains(&log.attempts) {
            return Err(StoreError::new("insert note", "injected failure"));
        }
        let id = next_id(&mut log.last_id);
        log.notes.push((id, note.clone()));
        Ok(id)
    }
}

#[derive(Debug, Default)]
struct TrackLog {
    tracks: Vec<(TrackId, NewTrack)>,
    points: Vec<(TrackId, TrackPoint)>,
    appended: u64,
    commits: u64,
    rollbacks: u64,
    fail_on_point: Option<u64>,
    fail_commit: bool,
    last_id: TrackId,
}

/// Track store recording tracks and committed points in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTrackStore {
    log: Arc<Mutex<TrackLog>>,
}

impl MemoryTrackStore {
    /// Fail the `point`-th call to `add_track_point` (1-based, across all
    /// transactions).
    #[must_use]
    pub fn failing_on_point(self, point: u64) -> Self {
        lock(&self.log).fail_on_point = Some(point);
        self
    }

    #[must_use]
    pub fn failing_commit(self) -> Self {
        lock(&self.log).fail_commit = true;
        self
    }

    #[must_use]
    pub fn tracks(&self) -> Vec<NewTrack> {
        lock(&self.log)
            .tracks
            .iter()
            .map(|(_, track)| track.clone())
            .collect()
    }

    /// Committed points of `track` in append order.
    #[must_use]
    pub fn points_for(&self, track: &str) -> Vec<TrackPoint> {
        let log = lock(&self.log);
        let ids: BTreeSet<TrackId> = log
            .tracks
            .iter()
            .filter(|(_, header)| header.name == track)
            .map(|(id, _)| *id)
            .collect();
        log.points
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(_, point)| *point)
            .collect()
    }

    #[must_use]
    pub fn committed_points(&self) -> usize {
        lock(&self.log).points.len()
    }

    #[must_use]
    pub fn commits(&self) -> u64 {
        lock(&self.log).commits
    }

    #[must_use]
    pub fn rollbacks(&self) -> u64 {
        lock(&self.log).rollbacks
    }
}

impl TrackStore for MemoryTrackStore {
    type Transaction<'a> = MemoryTrackTransaction<'a>;

    fn add_track(&mut self, track: &NewTrack) -> Result<TrackId, StoreError> {
        let mut log = lock(&self.log);
        let id = next_id(&mut log.last_id);
        log.tracks.push((id, track.clone()));
        Ok(id)
    }

    fn begin(&mut self) -> Result<Self::Transaction<'_>, StoreError> {
        Ok(MemoryTrackTransaction {
            log: &self.log,
            pending: Vec::new(),
        })
    }
}

/// Transaction buffering points until commit.
#[derive(Debug)]
pub struct MemoryTrackTransaction<'a> {
    log: &'a Mutex<TrackLog>,
    pending: Vec<(TrackId, TrackPoint)>,
}

impl TrackTransaction for MemoryTrackTransaction<'_> {
    fn add_track_point(&mut self, track: TrackId, point: &TrackPoint) -> Result<(), StoreError> {
        let mut log = lock(self.log);
        log.appended += 1;
        if log.fail_on_point == Some(log.appended) {
            return Err(StoreError::new("insert track point", "injected failure"));
        }
        self.pending.push((track, *point));
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut log = lock(self.log);
        if log.fail_commit {
            return Err(StoreError::new("commit track", "injected failure"));
        }
        log.points.extend(self.pending);
        log.commits += 1;
        Ok(())
    }

    fn rollback(self) -> Result<(), StoreError> {
        lock(self.log).rollbacks += 1;
        Ok(())
    }
}
