//! Behavioural tests for the tile-scan extraction engine.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use mapsift_core::feature::tags;
use mapsift_core::test_support::{
    ArchiveStats, MemoryAnnotationStore, MemoryArchive, MemoryTrackStore,
};
use mapsift_core::{
    BoundingBox, ExtractionEngine, ExtractionOptions, ExtractionOutcome, MicroCoord, RawPoint,
    RawWay, TileCoord, TileFeatures,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const TIMESTAMP: i64 = 1_700_000_000_000;

#[derive(Default)]
struct ExtractionWorld {
    bounds: Cell<Option<BoundingBox>>,
    tiles: RefCell<BTreeMap<TileCoord, TileFeatures>>,
    fail_on_read: Cell<Option<u64>>,
    notes: RefCell<MemoryAnnotationStore>,
    tracks: RefCell<MemoryTrackStore>,
    stats: RefCell<Option<ArchiveStats>>,
    ticks: RefCell<Vec<u64>>,
    outcome: RefCell<Option<ExtractionOutcome>>,
}

impl ExtractionWorld {
    fn archive(&self) -> MemoryArchive {
        let archive = MemoryArchive::with_tiles(self.tiles.borrow().clone());
        match self.fail_on_read.get() {
            Some(read) => archive.failing_on_read(read),
            None => archive,
        }
    }

    fn options(&self) -> ExtractionOptions {
        ExtractionOptions::points(self.bounds.get().expect("area configured"), 10)
    }

    fn extract(&self, options: ExtractionOptions) {
        let archive = self.archive();
        let ticks = RefCell::new(Vec::new());
        let outcome = ExtractionEngine::with_timestamp(options, TIMESTAMP).run(
            &archive,
            &mut self.notes.borrow().clone(),
            &mut self.tracks.borrow().clone(),
            |tick| ticks.borrow_mut().push(tick.current),
        );
        self.stats.replace(Some(archive.stats().clone()));
        self.ticks.replace(ticks.into_inner());
        self.outcome.replace(Some(outcome));
    }

    fn message(&self) -> String {
        self.outcome
            .borrow()
            .as_ref()
            .expect("extraction ran")
            .message()
    }

    fn stats(&self) -> ArchiveStats {
        self.stats.borrow().clone().expect("extraction ran")
    }

    fn first_tile(&self) -> std::cell::RefMut<'_, TileFeatures> {
        std::cell::RefMut::map(self.tiles.borrow_mut(), |tiles| {
            tiles.entry(TileCoord::new(540, 368, 10)).or_default()
        })
    }

    fn add_point(&self, elev: &str) {
        self.first_tile().points.push(RawPoint::new(
            10.0,
            45.0,
            tags([("elev", elev), ("name", "X")]),
        ));
    }
}

#[fixture]
fn world() -> ExtractionWorld {
    ExtractionWorld::default()
}

#[given("a two by two tile area at zoom 10")]
fn given_area(world: &ExtractionWorld) {
    world
        .bounds
        .set(Some(BoundingBox::new(45.0, 44.7, 10.3, 10.0)));
}

#[given("the first tile holds a point named X with elevation 120")]
fn given_numeric_point(world: &ExtractionWorld) {
    world.add_point("120");
}

#[given("the first tile holds a point named X with elevation abc")]
fn given_non_numeric_point(world: &ExtractionWorld) {
    world.add_point("abc");
}

#[given("the first tile holds a road with two nodes")]
fn given_road(world: &ExtractionWorld) {
    world.first_tile().ways.push(RawWay::new(
        tags([("highway", "track"), ("name", "Strada")]),
        vec![vec![
            MicroCoord::new(10_100_000, 44_900_000),
            MicroCoord::new(10_150_000, 44_850_000),
        ]],
    ));
}

#[given("the third tile cannot be decoded")]
fn given_corrupt_tile(world: &ExtractionWorld) {
    world.fail_on_read.set(Some(3));
}

#[given("the track store fails on the second track point")]
fn given_failing_track_store(world: &ExtractionWorld) {
    let store = world.tracks.take().failing_on_point(2);
    world.tracks.replace(store);
}

#[when("points are extracted")]
fn when_points_extracted(world: &ExtractionWorld) {
    world.extract(world.options());
}

#[when("ways are extracted")]
fn when_ways_extracted(world: &ExtractionWorld) {
    let options = ExtractionOptions {
        pois: false,
        ways: true,
        ..world.options()
    };
    world.extract(options);
}

#[when("points and ways are extracted twice reusing the first run's keys")]
fn when_extracted_twice(world: &ExtractionWorld) {
    let options = ExtractionOptions {
        ways: true,
        ..world.options()
    };
    let archive = world.archive();
    let first = ExtractionEngine::with_timestamp(options.clone(), TIMESTAMP).run(
        &archive,
        &mut MemoryAnnotationStore::default(),
        &mut MemoryTrackStore::default(),
        |_| {},
    );
    assert!(first.is_success(), "first run failed: {}", first.message());

    let notes = MemoryAnnotationStore::default();
    let tracks = MemoryTrackStore::default();
    let second = ExtractionEngine::with_timestamp(options, TIMESTAMP)
        .with_dedup_index(first.dedup)
        .run(&archive, &mut notes.clone(), &mut tracks.clone(), |_| {});
    world.notes.replace(notes);
    world.tracks.replace(tracks);
    world.outcome.replace(Some(second));
}

#[then("one note is stored with elevation 120")]
fn then_note_with_elevation(world: &ExtractionWorld) {
    let notes = world.notes.borrow().notes();
    assert_eq!(notes.len(), 1, "expected a single note");
    let note = notes.first().expect("one note");
    assert_eq!(note.elevation, 120.0);
    assert_eq!(note.label, "X");
}

#[then("one note is stored with the unknown elevation")]
fn then_note_with_unknown_elevation(world: &ExtractionWorld) {
    let notes = world.notes.borrow().notes();
    assert_eq!(notes.len(), 1, "expected a single note");
    assert_eq!(notes.first().expect("one note").elevation, -1.0);
}

#[then("no tracks are stored")]
fn then_no_tracks(world: &ExtractionWorld) {
    assert!(world.tracks.borrow().tracks().is_empty());
}

#[then("the result message is empty")]
fn then_message_empty(world: &ExtractionWorld) {
    assert_eq!(world.message(), "");
}

#[then("the result message is an error")]
fn then_message_error(world: &ExtractionWorld) {
    assert!(world.message().starts_with("ERROR: "), "got {:?}", world.message());
}

#[then("progress was reported for tiles 1 and 2 only")]
fn then_two_ticks(world: &ExtractionWorld) {
    assert_eq!(*world.ticks.borrow(), vec![1, 2]);
}

#[then("the archive was closed exactly once")]
fn then_closed_once(world: &ExtractionWorld) {
    assert_eq!(world.stats().closes(), 1);
}

#[then("no track commit is observed")]
fn then_no_commit(world: &ExtractionWorld) {
    let tracks = world.tracks.borrow();
    assert_eq!(tracks.commits(), 0);
    assert_eq!(tracks.committed_points(), 0);
}

#[then("no further tiles were read")]
fn then_no_further_tiles(world: &ExtractionWorld) {
    assert_eq!(world.stats().reads(), 1);
    assert!(world.ticks.borrow().is_empty());
}

#[then("the second run stores no notes and no tracks")]
fn then_second_run_empty(world: &ExtractionWorld) {
    assert_eq!(world.message(), "");
    assert!(world.notes.borrow().notes().is_empty());
    assert!(world.tracks.borrow().tracks().is_empty());
}

#[scenario(path = "tests/features/extraction.feature", index = 0)]
fn numeric_elevation(world: ExtractionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extraction.feature", index = 1)]
fn unknown_elevation(world: ExtractionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extraction.feature", index = 2)]
fn decode_failure(world: ExtractionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extraction.feature", index = 3)]
fn track_append_failure(world: ExtractionWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/extraction.feature", index = 4)]
fn seeded_second_run(world: ExtractionWorld) {
    let _ = world;
}
