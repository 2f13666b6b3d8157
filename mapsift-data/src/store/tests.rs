//! Unit coverage for the SQLite note and track stores.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

use super::*;

fn note(label: &str) -> NewNote {
    NewNote {
        lon: 10.0,
        lat: 45.0,
        elevation: 120.0,
        timestamp: 1_700_000_000_000,
        label: label.to_owned(),
        category: "POI".to_owned(),
        form: "{}".to_owned(),
        extra: None,
    }
}

fn track(name: &str) -> NewTrack {
    NewTrack {
        timestamp: 1_000,
        name: name.to_owned(),
        width: 6,
        color: "red".to_owned(),
        visible: true,
    }
}

fn point(timestamp: i64) -> TrackPoint {
    TrackPoint {
        lon: 10.1,
        lat: 44.9,
        elevation: -1.0,
        timestamp,
    }
}

#[fixture]
fn notes() -> SqliteNoteStore {
    SqliteNoteStore::from_connection(Connection::open_in_memory().expect("in-memory db"))
        .expect("initialise note store")
}

#[fixture]
fn tracks() -> SqliteTrackStore {
    SqliteTrackStore::from_connection(Connection::open_in_memory().expect("in-memory db"))
        .expect("initialise track store")
}

fn count(connection: &Connection, table: &str) -> i64 {
    connection
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count rows")
}

#[rstest]
#[case("nan")]
#[case("-inf")]
fn non_finite_elevations_store_the_sentinel(mut notes: SqliteNoteStore, #[case] elev: &str) {
    let point = mapsift_core::RawPoint::new(
        10.0,
        45.0,
        mapsift_core::feature::tags([("elev", elev), ("name", "X")]),
    );
    let classified = mapsift_core::classify_point(&point);
    let id = notes
        .add_note(&NewNote::from_point(&classified, 1_000))
        .expect("insert note");

    let altim: f64 = notes
        .connection()
        .query_row("SELECT altim FROM notes WHERE _id = ?1", [id], |row| {
            row.get(0)
        })
        .expect("read note");
    assert_eq!(altim, -1.0);
}

#[rstest]
fn inserts_notes_with_every_column(mut notes: SqliteNoteStore) {
    let first = notes.add_note(&note("X")).expect("insert note");
    let second = notes.add_note(&note("Y")).expect("insert note");
    assert!(second > first);

    let (altim, text, category, extra): (f64, String, String, Option<String>) = notes
        .connection()
        .query_row(
            "SELECT altim, text, category, extra FROM notes WHERE _id = ?1",
            [first],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .expect("read note");
    assert_eq!(altim, 120.0);
    assert_eq!(text, "X");
    assert_eq!(category, "POI");
    assert!(extra.is_none());
}

#[rstest]
fn commits_track_points_and_end_time(mut tracks: SqliteTrackStore) {
    let id = tracks.add_track(&track("Strada")).expect("insert track");
    let mut transaction = tracks.begin().expect("begin");
    transaction.add_track_point(id, &point(1_000)).expect("append");
    transaction.add_track_point(id, &point(2_000)).expect("append");
    transaction.commit().expect("commit");

    let connection = tracks.connection();
    assert_eq!(count(connection, "gpslogsdata"), 2);
    let (endts, width, visible): (i64, f64, bool) = connection
        .query_row(
            "SELECT endts, width, visible FROM gpslogs WHERE _id = ?1",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .expect("read track");
    assert_eq!(endts, 2_000);
    assert_eq!(width, 6.0);
    assert!(visible);
}

#[rstest]
fn rollback_discards_points(mut tracks: SqliteTrackStore) {
    let id = tracks.add_track(&track("Strada")).expect("insert track");
    let mut transaction = tracks.begin().expect("begin");
    transaction.add_track_point(id, &point(1_000)).expect("append");
    transaction.rollback().expect("rollback");

    assert_eq!(count(tracks.connection(), "gpslogsdata"), 0);
    assert_eq!(count(tracks.connection(), "gpslogs"), 1);
}

#[rstest]
fn dropped_transaction_discards_points(mut tracks: SqliteTrackStore) {
    let id = tracks.add_track(&track("Strada")).expect("insert track");
    {
        let mut transaction = tracks.begin().expect("begin");
        transaction.add_track_point(id, &point(1_000)).expect("append");
    }
    assert_eq!(count(tracks.connection(), "gpslogsdata"), 0);
}

#[rstest]
fn points_for_unknown_track_are_rejected(mut tracks: SqliteTrackStore) {
    let mut transaction = tracks.begin().expect("begin");
    let err = transaction
        .add_track_point(404, &point(1_000))
        .expect_err("foreign key violation");
    assert_eq!(err.operation, "insert track point");
}

#[rstest]
fn deleting_track_cascades_to_points(mut tracks: SqliteTrackStore) {
    let id = tracks.add_track(&track("Strada")).expect("insert track");
    let mut transaction = tracks.begin().expect("begin");
    transaction.add_track_point(id, &point(1_000)).expect("append");
    transaction.commit().expect("commit");

    tracks
        .connection()
        .execute("DELETE FROM gpslogs WHERE _id = ?1", [id])
        .expect("delete track");
    assert_eq!(count(tracks.connection(), "gpslogsdata"), 0);
}

#[rstest]
fn stores_share_one_file_in_nested_directory() {
    let dir = TempDir::new().expect("create temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("out/field/notes.sqlite"))
        .expect("utf-8 path");
    let mut notes = SqliteNoteStore::open(&path).expect("open note store");
    let mut tracks = SqliteTrackStore::open(&path).expect("open track store");

    notes.add_note(&note("X")).expect("insert note");
    let id = tracks.add_track(&track("Strada")).expect("insert track");
    let mut transaction = tracks.begin().expect("begin");
    transaction.add_track_point(id, &point(1_000)).expect("append");
    transaction.commit().expect("commit");
    notes.add_note(&note("Y")).expect("insert note after commit");

    let reopened = Connection::open(path.as_std_path()).expect("reopen");
    assert_eq!(count(&reopened, "notes"), 2);
    assert_eq!(count(&reopened, "gpslogsdata"), 1);
}
