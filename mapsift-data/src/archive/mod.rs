//! MBTiles archives with JSON tile payloads.
//!
//! The archive is a SQLite file holding a `metadata(name, value)` table and
//! a `tiles(zoom_level, tile_column, tile_row, tile_data)` table. Rows are
//! addressed in the TMS scheme, so the stored row is flipped relative to
//! the XYZ [`TileCoord`] used by the engine. When a `format` metadata entry
//! is present it must be `json`.

mod error;
mod payload;
mod writer;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use mapsift_core::tile::tiles_per_axis;
use mapsift_core::{ArchiveError, TileArchive, TileCoord, TileFeatures, TileReader};
use rusqlite::{Connection, OpenFlags, OptionalExtension};

pub use error::MbtilesError;
pub use writer::MbtilesWriter;

use payload::TilePayload;

/// Value of the `format` metadata entry for JSON payloads.
pub const JSON_FORMAT: &str = "json";

const SELECT_TILE: &str =
    "SELECT tile_data FROM tiles WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3";

/// Row of `tile` in the TMS scheme used by MBTiles.
///
/// Returns `None` when `tile.y` lies outside its zoom level.
#[must_use]
pub fn tms_row(tile: TileCoord) -> Option<u32> {
    tiles_per_axis(tile.zoom).checked_sub(1)?.checked_sub(tile.y)
}

/// An MBTiles file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MbtilesArchive {
    path: Utf8PathBuf,
}

impl MbtilesArchive {
    /// Archive backed by the MBTiles file at `path`; nothing is opened yet.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the MBTiles file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open_error(&self, source: MbtilesError) -> ArchiveError {
        ArchiveError::open(self.path.as_std_path(), source)
    }

    fn connect(&self) -> Result<Connection, MbtilesError> {
        let exists = mapsift_fs::is_regular_file(&self.path).map_err(|source| {
            MbtilesError::Io {
                path: self.path.clone(),
                source,
            }
        })?;
        if !exists {
            return Err(MbtilesError::Missing {
                path: self.path.clone(),
            });
        }
        let connection = Connection::open_with_flags(
            self.path.as_std_path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(MbtilesError::sqlite("open archive"))?;
        check_format(&connection)?;
        // Fails early when the tiles table is missing or malformed.
        connection
            .prepare_cached(SELECT_TILE)
            .map_err(MbtilesError::sqlite("prepare tile lookup"))?;
        Ok(connection)
    }
}

fn check_format(connection: &Connection) -> Result<(), MbtilesError> {
    let format: Option<String> = connection
        .query_row(
            "SELECT value FROM metadata WHERE name = 'format'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(MbtilesError::sqlite("read format metadata"))?;
    match format {
        Some(format) if !format.eq_ignore_ascii_case(JSON_FORMAT) => {
            Err(MbtilesError::UnsupportedFormat { format })
        }
        _ => Ok(()),
    }
}

impl TileArchive for MbtilesArchive {
    type Reader = MbtilesReader;

    fn open(&self) -> Result<Self::Reader, ArchiveError> {
        let connection = self.connect().map_err(|source| self.open_error(source))?;
        debug!("opened tile archive {}", self.path);
        Ok(MbtilesReader {
            connection: Some(connection),
        })
    }
}

/// Reader over an open MBTiles file.
#[derive(Debug)]
pub struct MbtilesReader {
    connection: Option<Connection>,
}

impl MbtilesReader {
    fn fetch(&self, tile: TileCoord) -> Result<TileFeatures, MbtilesError> {
        let connection = self.connection.as_ref().ok_or(MbtilesError::Closed)?;
        let Some(row) = tms_row(tile) else {
            return Ok(TileFeatures::default());
        };
        let data: Option<Vec<u8>> = connection
            .prepare_cached(SELECT_TILE)
            .map_err(MbtilesError::sqlite("prepare tile lookup"))?
            .query_row((tile.zoom, tile.x, row), |row| row.get(0))
            .optional()
            .map_err(MbtilesError::sqlite("read tile"))?;
        let Some(data) = data else {
            return Ok(TileFeatures::default());
        };
        let payload: TilePayload = serde_json::from_slice(&data)?;
        Ok(payload.into())
    }
}

impl TileReader for MbtilesReader {
    fn read_tile(&mut self, tile: TileCoord) -> Result<TileFeatures, ArchiveError> {
        self.fetch(tile)
            .map_err(|source| ArchiveError::decode(tile, source))
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.take()
            && let Err((_, err)) = connection.close()
        {
            warn!("failed to close tile archive: {err}");
        }
    }
}
