//! Raw features as decoded from a single archive tile.
//!
//! These values are produced fresh for every tile read and consumed
//! immediately by the extraction engine; nothing here outlives a tile.

use geo::Coord;

/// One key/value tag, kept in decode order.
pub type Tag = (String, String);

/// Scale of the fixed-point way node encoding (micro-degrees).
pub const MICRO_DEGREES: f64 = 1_000_000.0;

/// A point of interest with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    /// WGS84 position with `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Key/value tags in archive order.
    pub tags: Vec<Tag>,
}

impl RawPoint {
    /// Build a point from WGS84 degrees and its tags.
    pub fn new(lon: f64, lat: f64, tags: Vec<Tag>) -> Self {
        Self {
            location: Coord { x: lon, y: lat },
            tags,
        }
    }
}

/// A way node encoded as integer micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MicroCoord {
    /// Longitude in micro-degrees.
    pub x: i32,
    /// Latitude in micro-degrees.
    pub y: i32,
}

impl MicroCoord {
    /// Build a node from micro-degree longitude and latitude.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Recover degrees by dividing both axes by one million.
    pub fn to_degrees(self) -> Coord<f64> {
        Coord {
            x: f64::from(self.x) / MICRO_DEGREES,
            y: f64::from(self.y) / MICRO_DEGREES,
        }
    }
}

/// A tagged line feature made of one or more sub-paths.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWay {
    /// Key/value tags in archive order.
    pub tags: Vec<Tag>,
    /// Sub-paths, each an ordered run of nodes.
    pub paths: Vec<Vec<MicroCoord>>,
}

impl RawWay {
    /// Build a way from its tags and sub-paths.
    pub fn new(tags: Vec<Tag>, paths: Vec<Vec<MicroCoord>>) -> Self {
        Self { tags, paths }
    }

    /// Number of nodes across every sub-path.
    pub fn node_count(&self) -> usize {
        self.paths.iter().map(Vec::len).sum()
    }
}

/// Everything decoded from one tile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileFeatures {
    /// Points of interest in the tile.
    pub points: Vec<RawPoint>,
    /// Line features in the tile.
    pub ways: Vec<RawWay>,
}

impl TileFeatures {
    /// `true` when the tile holds neither points nor ways.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.ways.is_empty()
    }
}

/// Build a tag list from string pairs.
///
/// # Examples
/// ```
/// use mapsift_core::feature::tags;
///
/// let tags = tags([("name", "Hut"), ("elev", "2100")]);
/// assert_eq!(tags[0], ("name".to_owned(), "Hut".to_owned()));
/// ```
pub fn tags<'a, I>(pairs: I) -> Vec<Tag>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}
