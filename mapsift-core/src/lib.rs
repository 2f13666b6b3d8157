//! Core domain types and the tile-scan extraction engine for mapsift.
//!
//! Responsibilities:
//! - Project a bounding box onto tile ranges across successive zoom levels.
//! - Classify decoded map features by their tags and filter them by text.
//! - Deduplicate features across a whole scan and hand survivors to stores.
//!
//! Boundaries:
//! - The tile archive format and the persistence backends live behind the
//!   [`TileArchive`] and [`AnnotationStore`]/[`TrackStore`] traits; concrete
//!   adapters belong in `mapsift-data`.
//!
//! Invariants:
//! - No global mutable state. Every scan owns its deduplication index and
//!   progress counter.
#![forbid(unsafe_code)]

pub mod archive;
pub mod bounds;
pub mod classify;
pub mod dedup;
pub mod engine;
pub mod feature;
pub mod filter;
pub mod store;
pub mod test_support;
pub mod tile;

pub use archive::{ArchiveError, ArchiveSession, BoxError, TileArchive, TileReader};
pub use bounds::BoundingBox;
pub use classify::{
    ClassifiedPoint, ClassifiedWay, UNKNOWN_ELEVATION, classify_point, classify_way,
};
pub use dedup::DedupIndex;
pub use engine::{
    CancelFlag, ExtractionEngine, ExtractionError, ExtractionHandle, ExtractionOptions,
    ExtractionOutcome, ExtractionReport, ExtractionState, ProgressTick, spawn_extraction,
};
pub use feature::{MicroCoord, RawPoint, RawWay, Tag, TileFeatures};
pub use filter::TextFilter;
pub use store::{
    AnnotationStore, NewNote, NewTrack, NoteId, StoreError, TrackId, TrackPoint, TrackStore,
    TrackTransaction,
};
pub use tile::{MAX_ZOOM, TileCoord, TileRange, TileRangePlan, ZOOM_DEPTH};
