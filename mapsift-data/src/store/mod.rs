//! SQLite persistence for notes and track logs.
//!
//! Notes and tracks are written through separate connections to the same
//! database file, one per store, so the engine can hold both stores at once.
//! The schema is created on open.

mod schema;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use mapsift_core::{
    AnnotationStore, NewNote, NewTrack, NoteId, StoreError, TrackId, TrackPoint, TrackStore,
    TrackTransaction,
};
use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

pub use schema::initialise_schema;

const INSERT_NOTE: &str = "INSERT INTO notes (lon, lat, altim, ts, text, category, form, extra)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const INSERT_TRACK: &str =
    "INSERT INTO gpslogs (startts, endts, lengthm, text, color, width, visible)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const INSERT_TRACK_POINT: &str = "INSERT INTO gpslogsdata (logid, lon, lat, altim, ts)
     VALUES (?1, ?2, ?3, ?4, ?5)";
const UPDATE_TRACK_END: &str = "UPDATE gpslogs SET endts = ?2 WHERE _id = ?1";

/// Errors raised while opening a store database.
#[derive(Debug, Error)]
pub enum StoreOpenError {
    /// Failed to create the parent directory of the database file.
    #[error("failed to create parent directory for {path}: {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: SqliteError,
    },
    /// Creating the schema failed.
    #[error("failed to {step}: {source}")]
    Schema {
        /// Schema step being performed.
        step: &'static str,
        #[source]
        source: SqliteError,
    },
}

impl StoreOpenError {
    fn schema(step: &'static str) -> impl FnOnce(SqliteError) -> Self {
        move |source| Self::Schema { step, source }
    }
}

fn open_connection(path: &Utf8Path) -> Result<Connection, StoreOpenError> {
    mapsift_fs::ensure_parent_dir(path).map_err(|source| StoreOpenError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| StoreOpenError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    initialise_schema(&mut connection)?;
    debug!("opened store database {path}");
    Ok(connection)
}

/// Notes table writer.
#[derive(Debug)]
pub struct SqliteNoteStore {
    connection: Connection,
}

impl SqliteNoteStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns [`StoreOpenError`] when the file or schema cannot be set up.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreOpenError> {
        open_connection(path).map(|connection| Self { connection })
    }

    /// Wrap an existing connection, creating the schema if needed.
    ///
    /// # Errors
    /// Returns [`StoreOpenError::Schema`] when the schema cannot be created.
    pub fn from_connection(mut connection: Connection) -> Result<Self, StoreOpenError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl AnnotationStore for SqliteNoteStore {
    fn add_note(&mut self, note: &NewNote) -> Result<NoteId, StoreError> {
        self.connection
            .prepare_cached(INSERT_NOTE)
            .map_err(|source| StoreError::new("prepare note insert", source))?
            .insert((
                note.lon,
                note.lat,
                note.elevation,
                note.timestamp,
                note.label.as_str(),
                note.category.as_str(),
                note.form.as_str(),
                note.extra.as_deref(),
            ))
            .map_err(|source| StoreError::new("insert note", source))
    }
}

/// Track log writer.
#[derive(Debug)]
pub struct SqliteTrackStore {
    connection: Connection,
}

impl SqliteTrackStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns [`StoreOpenError`] when the file or schema cannot be set up.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreOpenError> {
        open_connection(path).map(|connection| Self { connection })
    }

    /// Wrap an existing connection, creating the schema if needed.
    ///
    /// # Errors
    /// Returns [`StoreOpenError::Schema`] when the schema cannot be created.
    pub fn from_connection(mut connection: Connection) -> Result<Self, StoreOpenError> {
        initialise_schema(&mut connection)?;
        Ok(Self { connection })
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl TrackStore for SqliteTrackStore {
    type Transaction<'a> = SqliteTrackTransaction<'a>;

    fn add_track(&mut self, track: &NewTrack) -> Result<TrackId, StoreError> {
        self.connection
            .prepare_cached(INSERT_TRACK)
            .map_err(|source| StoreError::new("prepare track insert", source))?
            .insert((
                track.timestamp,
                track.timestamp,
                0.0_f64,
                track.name.as_str(),
                track.color.as_str(),
                f64::from(track.width),
                track.visible,
            ))
            .map_err(|source| StoreError::new("insert track", source))
    }

    fn begin(&mut self) -> Result<Self::Transaction<'_>, StoreError> {
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::new("begin track transaction", source))?;
        Ok(SqliteTrackTransaction {
            transaction,
            last_point: None,
        })
    }
}

/// Transaction appending points to track logs.
///
/// Committing also moves the end timestamp of the last track written to its
/// final point. Dropping without committing rolls back.
#[derive(Debug)]
pub struct SqliteTrackTransaction<'a> {
    transaction: Transaction<'a>,
    last_point: Option<(TrackId, i64)>,
}

impl TrackTransaction for SqliteTrackTransaction<'_> {
    fn add_track_point(&mut self, track: TrackId, point: &TrackPoint) -> Result<(), StoreError> {
        self.transaction
            .prepare_cached(INSERT_TRACK_POINT)
            .map_err(|source| StoreError::new("prepare track point insert", source))?
            .execute((track, point.lon, point.lat, point.elevation, point.timestamp))
            .map_err(|source| StoreError::new("insert track point", source))?;
        self.last_point = Some((track, point.timestamp));
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        if let Some((track, end)) = self.last_point {
            self.transaction
                .execute(UPDATE_TRACK_END, (track, end))
                .map_err(|source| StoreError::new("update track end", source))?;
        }
        self.transaction
            .commit()
            .map_err(|source| StoreError::new("commit track", source))
    }

    fn rollback(self) -> Result<(), StoreError> {
        self.transaction
            .rollback()
            .map_err(|source| StoreError::new("roll back track", source))
    }
}

#[cfg(test)]
mod tests;
