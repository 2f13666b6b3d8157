//! Storage adapters for mapsift.
//!
//! Responsibilities:
//! - Read tiles from MBTiles archives whose tile data is JSON encoded.
//! - Persist notes and track logs into a SQLite database.
//!
//! Boundaries:
//! - Classification, filtering and deduplication live in `mapsift-core`;
//!   this crate only moves data in and out of SQLite.
//!
//! Invariants:
//! - Every fallible operation names the SQLite step that failed.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod archive;
pub mod store;

pub use archive::{MbtilesArchive, MbtilesError, MbtilesReader, MbtilesWriter};
pub use store::{SqliteNoteStore, SqliteTrackStore, SqliteTrackTransaction, StoreOpenError};
