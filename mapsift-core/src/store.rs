//! Persistence traits for extracted features.
//!
//! Points become notes through an [`AnnotationStore`]; ways become track
//! logs through a [`TrackStore`]. Note writes are independent best-effort
//! operations, while the points of one track are appended inside a single
//! [`TrackTransaction`] that is either committed or rolled back as a whole.

use thiserror::Error;

use crate::BoxError;
use crate::classify::ClassifiedPoint;

/// Identifier assigned to a stored note.
pub type NoteId = i64;

/// Identifier assigned to a stored track.
pub type TrackId = i64;

/// Category recorded for every extracted point.
pub const POI_CATEGORY: &str = "POI";

/// Error reported by a persistence backend.
#[derive(Debug, Error)]
#[error("failed to {operation}: {source}")]
pub struct StoreError {
    /// Operation being performed.
    pub operation: &'static str,
    /// Backend failure.
    #[source]
    pub source: BoxError,
}

impl StoreError {
    /// Wrap a backend failure raised by `operation`.
    pub fn new(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// A note to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Elevation in metres, `-1.0` when unknown.
    pub elevation: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Text shown on the map.
    pub label: String,
    /// Note category, `POI` for extracted points.
    pub category: String,
    /// JSON form text holding the source tags.
    pub form: String,
    /// Free-form payload; unused by extraction.
    pub extra: Option<String>,
}

impl NewNote {
    /// Note for an extracted point of interest.
    pub fn from_point(point: &ClassifiedPoint, timestamp: i64) -> Self {
        Self {
            lon: point.location.x,
            lat: point.location.y,
            elevation: point.elevation_or_unknown(),
            timestamp,
            label: point.label.clone(),
            category: POI_CATEGORY.to_owned(),
            form: point.form.clone(),
            extra: None,
        }
    }
}

/// A track log header to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrack {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Track name, the road class or `contour`.
    pub name: String,
    /// Line width in pixels.
    pub width: u32,
    /// Line colour name.
    pub color: String,
    /// Whether the track is drawn.
    pub visible: bool,
}

/// One point appended to a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Elevation in metres, `-1.0` when unknown.
    pub elevation: f64,
    /// Milliseconds since the Unix epoch; only orders the points.
    pub timestamp: i64,
}

/// Inserts notes.
pub trait AnnotationStore {
    /// Insert a note and return its row id.
    fn add_note(&mut self, note: &NewNote) -> Result<NoteId, StoreError>;
}

/// Inserts track headers and opens transactions for their points.
pub trait TrackStore {
    /// Transaction handed out by [`TrackStore::begin`].
    type Transaction<'a>: TrackTransaction
    where
        Self: 'a;

    /// Insert a track header and return its row id.
    fn add_track(&mut self, track: &NewTrack) -> Result<TrackId, StoreError>;

    /// Begin a transaction for appending track points.
    fn begin(&mut self) -> Result<Self::Transaction<'_>, StoreError>;
}

/// An open transaction over a [`TrackStore`].
///
/// Dropping a transaction without committing discards its writes.
pub trait TrackTransaction {
    /// Append a point to `track`.
    fn add_track_point(&mut self, track: TrackId, point: &TrackPoint) -> Result<(), StoreError>;

    /// Make every appended point durable.
    fn commit(self) -> Result<(), StoreError>;

    /// Discard every appended point.
    fn rollback(self) -> Result<(), StoreError>;
}
