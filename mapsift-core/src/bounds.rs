//! Geographic bounding boxes supplied by the caller of an extraction.

use geo::Coord;

/// Area to extract, in WGS84 degrees.
///
/// The box is taken as given: `north >= south` and `east >= west` are not
/// enforced. An inverted box projects onto empty tile ranges and contains no
/// coordinates.
///
/// # Examples
/// ```
/// use mapsift_core::BoundingBox;
///
/// let bounds = BoundingBox::new(45.0, 44.7, 10.3, 10.0);
/// assert!(bounds.contains(10.0, 45.0));
/// assert!(!bounds.contains(10.31, 44.8));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Northern edge in degrees of latitude.
    pub north: f64,
    /// Southern edge in degrees of latitude.
    pub south: f64,
    /// Eastern edge in degrees of longitude.
    pub east: f64,
    /// Western edge in degrees of longitude.
    pub west: f64,
}

impl BoundingBox {
    /// Construct a box from its four edges in north/south/east/west order.
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Whether `lon`/`lat` falls inside the box. Edges are inclusive.
    ///
    /// Non-finite coordinates are never contained.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Whether the coordinate (`x = longitude`, `y = latitude`) is contained.
    pub fn contains_coord(&self, coord: Coord<f64>) -> bool {
        self.contains(coord.x, coord.y)
    }

    /// Whether both axes are ordered (`west <= east`, `south <= north`).
    pub fn is_well_formed(&self) -> bool {
        self.west <= self.east && self.south <= self.north
    }
}
