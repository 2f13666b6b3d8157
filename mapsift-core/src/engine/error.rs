use std::io;

use thiserror::Error;

use crate::{ArchiveError, StoreError};

/// Fatal conditions that end an extraction run.
///
/// Failures to store a single point are not fatal and never appear here;
/// they are counted in [`ExtractionReport::notes_failed`].
///
/// [`ExtractionReport::notes_failed`]: crate::ExtractionReport::notes_failed
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The archive could not be opened or a tile could not be decoded.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    /// The header of a track could not be inserted.
    #[error("failed to create track {name:?}: {source}")]
    TrackCreate {
        /// Display name of the way.
        name: String,
        #[source]
        source: StoreError,
    },
    /// Appending or committing the points of a track failed. The track's
    /// transaction was rolled back.
    #[error("failed to write track {name:?}: {source}")]
    TrackWrite {
        /// Display name of the way.
        name: String,
        #[source]
        source: StoreError,
    },
    /// The run was cancelled through its [`CancelFlag`](crate::CancelFlag).
    #[error("extraction cancelled after {tiles} tiles")]
    Cancelled {
        /// Tiles fully processed before cancellation was observed.
        tiles: u64,
    },
    /// The worker thread could not be started.
    #[error("failed to spawn extraction worker: {0}")]
    Spawn(#[source] io::Error),
    /// The worker thread panicked before producing an outcome.
    #[error("extraction worker panicked")]
    WorkerPanicked,
}
