//! Access to a tiled map archive.
//!
//! The binary layout of an archive is opaque to the engine. Implementers
//! provide [`TileArchive`] to open a reader and [`TileReader`] to decode
//! individual tiles. The engine wraps every reader in an [`ArchiveSession`]
//! so that [`TileReader::close`] runs exactly once, whatever way the scan
//! ends.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::{TileCoord, TileFeatures};

/// Type-erased error carried as the source of archive and store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while opening or decoding an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive could not be opened or its header is unusable.
    #[error("failed to open tile archive at {path:?}: {source}")]
    Open {
        /// Location of the archive.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
    /// A tile's data could not be read or parsed.
    #[error("failed to decode tile {tile}: {source}")]
    Decode {
        /// Tile being decoded.
        tile: TileCoord,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl ArchiveError {
    /// Archive at `path` could not be opened.
    pub fn open(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Open {
            path: path.into(),
            source: source.into(),
        }
    }

    /// `tile` could not be read or decoded.
    pub fn decode(tile: TileCoord, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            tile,
            source: source.into(),
        }
    }
}

/// Opens readers over a tile archive.
///
/// # Examples
///
/// ```rust
/// use mapsift_core::{ArchiveError, TileArchive, TileCoord, TileFeatures, TileReader};
///
/// struct EmptyArchive;
/// struct EmptyReader;
///
/// impl TileArchive for EmptyArchive {
///     type Reader = EmptyReader;
///
///     fn open(&self) -> Result<Self::Reader, ArchiveError> {
///         Ok(EmptyReader)
///     }
/// }
///
/// impl TileReader for EmptyReader {
///     fn read_tile(&mut self, _tile: TileCoord) -> Result<TileFeatures, ArchiveError> {
///         Ok(TileFeatures::default())
///     }
///
///     fn close(&mut self) {}
/// }
///
/// let mut reader = EmptyArchive.open()?;
/// assert!(reader.read_tile(TileCoord::new(0, 0, 0))?.is_empty());
/// # Ok::<(), ArchiveError>(())
/// ```
pub trait TileArchive {
    /// Reader handed out by [`TileArchive::open`].
    type Reader: TileReader;

    /// Open a reader. Must succeed before any tile is decoded.
    fn open(&self) -> Result<Self::Reader, ArchiveError>;
}

/// Decodes tiles from an open archive.
pub trait TileReader {
    /// Decode the features of one tile. A missing tile is an empty set.
    fn read_tile(&mut self, tile: TileCoord) -> Result<TileFeatures, ArchiveError>;

    /// Release the archive handle. Called once by [`ArchiveSession`].
    fn close(&mut self);
}

/// Scoped ownership of an open reader; closes it on drop.
#[derive(Debug)]
pub struct ArchiveSession<R: TileReader> {
    reader: R,
}

impl<R: TileReader> ArchiveSession<R> {
    /// Open `archive` and take ownership of the resulting reader.
    pub fn open<A>(archive: &A) -> Result<Self, ArchiveError>
    where
        A: TileArchive<Reader = R>,
    {
        let reader = archive.open()?;
        Ok(Self { reader })
    }

    /// Decode one tile through the owned reader.
    pub fn read_tile(&mut self, tile: TileCoord) -> Result<TileFeatures, ArchiveError> {
        self.reader.read_tile(tile)
    }
}

impl<R: TileReader> Drop for ArchiveSession<R> {
    fn drop(&mut self) {
        debug!("closing tile archive");
        self.reader.close();
    }
}
