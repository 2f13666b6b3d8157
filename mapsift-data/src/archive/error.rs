use camino::Utf8PathBuf;
use mapsift_core::TileCoord;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised while reading or writing an MBTiles archive.
#[derive(Debug, Error)]
pub enum MbtilesError {
    /// No regular file exists at the archive path.
    #[error("no archive file at {path}")]
    Missing { path: Utf8PathBuf },
    /// Probing or preparing the archive location failed.
    #[error("failed to access {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A SQLite step failed.
    #[error("failed to {operation}: {source}")]
    Sqlite {
        /// Step being performed.
        operation: &'static str,
        #[source]
        source: SqliteError,
    },
    /// The archive declares a tile format other than JSON.
    #[error("unsupported tile format {format:?}")]
    UnsupportedFormat { format: String },
    /// A tile payload is not valid JSON in the expected shape.
    #[error("invalid tile payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The tile row lies outside its zoom level.
    #[error("tile {tile} is outside its zoom level")]
    TileOutOfRange { tile: TileCoord },
    /// The reader was used after being closed.
    #[error("archive reader already closed")]
    Closed,
}

impl MbtilesError {
    /// Adapter for `map_err` tagging a SQLite error with its step.
    pub(crate) fn sqlite(operation: &'static str) -> impl FnOnce(SqliteError) -> Self {
        move |source| Self::Sqlite { operation, source }
    }
}
