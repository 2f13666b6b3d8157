//! Facade crate for the mapsift tile extraction engine.
//!
//! This crate re-exports the core domain types and exposes the SQLite and
//! MBTiles adapters behind the `store-sqlite` feature flag.

#![forbid(unsafe_code)]

pub use mapsift_core::{
    AnnotationStore, BoundingBox, CancelFlag, DedupIndex, ExtractionEngine, ExtractionError,
    ExtractionHandle, ExtractionOptions, ExtractionOutcome, ExtractionReport, ExtractionState,
    ProgressTick, TextFilter, TileArchive, TileCoord, TileFeatures, TileReader, TrackStore,
    TrackTransaction, spawn_extraction,
};

#[cfg(feature = "store-sqlite")]
pub use mapsift_data::{
    MbtilesArchive, MbtilesError, MbtilesWriter, SqliteNoteStore, SqliteTrackStore,
    StoreOpenError,
};
