use rusqlite::{Connection, Transaction};

use super::StoreOpenError;

const TABLES: &[(&str, &str)] = &[
    (
        "create notes table",
        "CREATE TABLE IF NOT EXISTS notes (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            lon REAL NOT NULL,
            lat REAL NOT NULL,
            altim REAL NOT NULL,
            ts INTEGER NOT NULL,
            text TEXT NOT NULL,
            category TEXT NOT NULL,
            form TEXT,
            extra TEXT
        )",
    ),
    (
        "create gpslogs table",
        "CREATE TABLE IF NOT EXISTS gpslogs (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            startts INTEGER NOT NULL,
            endts INTEGER NOT NULL,
            lengthm REAL NOT NULL,
            text TEXT NOT NULL,
            color TEXT NOT NULL,
            width REAL NOT NULL,
            visible INTEGER NOT NULL
        )",
    ),
    (
        "create gpslogsdata table",
        "CREATE TABLE IF NOT EXISTS gpslogsdata (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            logid INTEGER NOT NULL REFERENCES gpslogs(_id) ON DELETE CASCADE,
            lon REAL NOT NULL,
            lat REAL NOT NULL,
            altim REAL NOT NULL,
            ts INTEGER NOT NULL
        )",
    ),
    (
        "create gpslogsdata index",
        "CREATE INDEX IF NOT EXISTS gpslogsdata_logid ON gpslogsdata (logid, ts)",
    ),
];

/// Create the notes and track log tables if they are missing.
///
/// Foreign keys are enabled on `connection` so that deleting a track log
/// removes its points.
///
/// # Errors
/// Returns [`StoreOpenError::Schema`] naming the step that failed.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use mapsift_data::store::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// initialise_schema(&mut conn).expect("schema creation is idempotent");
/// let tables: i64 = conn
///     .query_row(
///         "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('notes', 'gpslogs', 'gpslogsdata')",
///         [],
///         |row| row.get(0),
///     )
///     .expect("count tables");
/// assert_eq!(tables, 3);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), StoreOpenError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(StoreOpenError::schema("enable foreign keys"))?;
    let transaction = connection
        .transaction()
        .map_err(StoreOpenError::schema("begin schema transaction"))?;
    create_tables(&transaction)?;
    transaction
        .commit()
        .map_err(StoreOpenError::schema("commit schema transaction"))
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), StoreOpenError> {
    for &(step, sql) in TABLES {
        transaction
            .execute(sql, [])
            .map_err(StoreOpenError::schema(step))?;
    }
    Ok(())
}
