use camino::Utf8Path;
use mapsift_core::{TileCoord, TileFeatures};
use rusqlite::Connection;

use super::payload::TilePayload;
use super::{JSON_FORMAT, MbtilesError, tms_row};

/// Builds MBTiles archives in the JSON payload encoding read by
/// [`MbtilesArchive`](super::MbtilesArchive).
///
/// # Examples
/// ```
/// use mapsift_core::{RawPoint, TileArchive, TileCoord, TileFeatures, TileReader};
/// use mapsift_data::{MbtilesArchive, MbtilesWriter};
///
/// let dir = tempfile::tempdir().expect("create temp dir");
/// let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("demo.mbtiles"))
///     .expect("utf-8 path");
/// let tile = TileCoord::new(540, 368, 10);
/// let features = TileFeatures {
///     points: vec![RawPoint::new(10.0, 45.0, Vec::new())],
///     ways: Vec::new(),
/// };
///
/// let mut writer = MbtilesWriter::create(&path).expect("create archive");
/// writer.insert_tile(tile, &features).expect("insert tile");
/// drop(writer);
///
/// let mut reader = MbtilesArchive::new(path).open().expect("open archive");
/// assert_eq!(reader.read_tile(tile).expect("read tile"), features);
/// ```
#[derive(Debug)]
pub struct MbtilesWriter {
    pub(super) connection: Connection,
}

impl MbtilesWriter {
    /// Create (or reopen) an archive at `path`, creating parent directories
    /// and the MBTiles tables as needed.
    ///
    /// # Errors
    /// Returns [`MbtilesError`] when the file or its schema cannot be set up.
    pub fn create(path: &Utf8Path) -> Result<Self, MbtilesError> {
        mapsift_fs::ensure_parent_dir(path).map_err(|source| MbtilesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(MbtilesError::sqlite("create archive"))?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS metadata (name TEXT NOT NULL, value TEXT);
                 CREATE UNIQUE INDEX IF NOT EXISTS metadata_name ON metadata (name);
                 CREATE TABLE IF NOT EXISTS tiles (
                     zoom_level INTEGER NOT NULL,
                     tile_column INTEGER NOT NULL,
                     tile_row INTEGER NOT NULL,
                     tile_data BLOB
                 );
                 CREATE UNIQUE INDEX IF NOT EXISTS tile_index
                     ON tiles (zoom_level, tile_column, tile_row);",
            )
            .map_err(MbtilesError::sqlite("create archive schema"))?;
        let mut writer = Self { connection };
        writer.set_metadata("format", JSON_FORMAT)?;
        Ok(writer)
    }

    /// Insert or replace one metadata entry.
    ///
    /// # Errors
    /// Returns [`MbtilesError::Sqlite`] when the write fails.
    pub fn set_metadata(&mut self, name: &str, value: &str) -> Result<(), MbtilesError> {
        self.connection
            .execute(
                "INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
                (name, value),
            )
            .map(|_| ())
            .map_err(MbtilesError::sqlite("write metadata"))
    }

    /// Insert or replace the features of one tile.
    ///
    /// # Errors
    /// Returns [`MbtilesError`] when the payload cannot be encoded or written.
    pub fn insert_tile(
        &mut self,
        tile: TileCoord,
        features: &TileFeatures,
    ) -> Result<(), MbtilesError> {
        let data = serde_json::to_vec(&TilePayload::from(features))?;
        self.insert_raw(tile, &data)
    }

    /// Store `data` verbatim as the tile's payload.
    ///
    /// # Errors
    /// Returns [`MbtilesError::Sqlite`] when the write fails.
    pub fn insert_raw(&mut self, tile: TileCoord, data: &[u8]) -> Result<(), MbtilesError> {
        let row = tms_row(tile).ok_or(MbtilesError::TileOutOfRange { tile })?;
        self.connection
            .prepare_cached(
                "INSERT OR REPLACE INTO tiles (zoom_level, tile_column, tile_row, tile_data)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(MbtilesError::sqlite("prepare tile insert"))?
            .execute((tile.zoom, tile.x, row, data))
            .map(|_| ())
            .map_err(MbtilesError::sqlite("write tile"))
    }
}
