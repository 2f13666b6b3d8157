//! Web Mercator tile addressing and the per-zoom tile ranges of a scan.
//!
//! A scan starts at a base zoom level and descends a fixed number of levels
//! so that features only present at finer zooms are still discovered. Each
//! level is covered by the closed rectangle of tiles touching the bounding
//! box.

use std::f64::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;

use crate::BoundingBox;

/// Deepest zoom level addressable in an archive.
pub const MAX_ZOOM: u8 = 22;

/// Number of levels scanned below the base zoom.
pub const ZOOM_DEPTH: u8 = 4;

/// A tile in the XYZ scheme (`y` grows southwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCoord {
    /// Column, counted eastwards from the antimeridian.
    pub x: u32,
    /// Row, counted southwards from the northern Mercator limit.
    pub y: u32,
    /// Zoom level; each axis has `2^zoom` tiles.
    pub zoom: u8,
}

impl TileCoord {
    /// Build a tile coordinate from its column, row and zoom level.
    pub const fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Number of tiles along one axis at `zoom`.
///
/// Zoom levels beyond [`MAX_ZOOM`] are treated as [`MAX_ZOOM`].
pub const fn tiles_per_axis(zoom: u8) -> u32 {
    let zoom = if zoom > MAX_ZOOM { MAX_ZOOM } else { zoom };
    1 << zoom
}

/// Column of the tile containing `lon` at `zoom`, clamped to the valid range.
pub fn longitude_to_tile_x(lon: f64, zoom: u8) -> u32 {
    let n = f64::from(tiles_per_axis(zoom));
    clamp_index(((lon + 180.0) / 360.0 * n).floor(), zoom)
}

/// Row of the tile containing `lat` at `zoom`, clamped to the valid range.
///
/// Latitudes beyond the Mercator limit (about ±85.0511°) land on the first or
/// last row.
pub fn latitude_to_tile_y(lat: f64, zoom: u8) -> u32 {
    let n = f64::from(tiles_per_axis(zoom));
    let sin_lat = lat.to_radians().sin();
    let mercator = ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);
    clamp_index(((0.5 - mercator) * n).floor(), zoom)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is floored and clamped to the tile index range first"
)]
fn clamp_index(value: f64, zoom: u8) -> u32 {
    let max = f64::from(tiles_per_axis(zoom) - 1);
    // NaN falls through `clamp` and saturates to zero on the cast.
    value.clamp(0.0, max) as u32
}

/// Closed rectangle of tiles covering a bounding box at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// Zoom level of every tile in the range.
    pub zoom: u8,
    /// Distance from the base zoom of the scan (0 for the base level).
    pub offset: u8,
    /// Westernmost column, inclusive.
    pub start_x: u32,
    /// Easternmost column, inclusive.
    pub end_x: u32,
    /// Northernmost row, inclusive.
    pub start_y: u32,
    /// Southernmost row, inclusive.
    pub end_y: u32,
}

impl TileRange {
    /// Project `bounds` at `zoom`: west/north give the start corner and
    /// east/south the end corner.
    pub fn covering(bounds: &BoundingBox, zoom: u8, offset: u8) -> Self {
        Self {
            zoom,
            offset,
            start_x: longitude_to_tile_x(bounds.west, zoom),
            end_x: longitude_to_tile_x(bounds.east, zoom),
            start_y: latitude_to_tile_y(bounds.north, zoom),
            end_y: latitude_to_tile_y(bounds.south, zoom),
        }
    }

    /// Whether this is the base level of the scan.
    pub const fn is_base_level(&self) -> bool {
        self.offset == 0
    }

    /// Number of tiles in the range; zero when either axis is inverted.
    pub fn tile_count(&self) -> u64 {
        axis_span(self.start_x, self.end_x) * axis_span(self.start_y, self.end_y)
    }

    /// Tiles in column-major order: `x` ascending, then `y` ascending.
    pub fn tiles(self) -> impl Iterator<Item = TileCoord> {
        let zoom = self.zoom;
        let rows: RangeInclusive<u32> = self.start_y..=self.end_y;
        (self.start_x..=self.end_x)
            .flat_map(move |x| rows.clone().map(move |y| TileCoord::new(x, y, zoom)))
    }
}

fn axis_span(start: u32, end: u32) -> u64 {
    if end >= start {
        u64::from(end - start) + 1
    } else {
        0
    }
}

/// Tile ranges for every zoom level visited by a scan.
///
/// # Examples
/// ```
/// use mapsift_core::{BoundingBox, TileRangePlan};
///
/// let plan = TileRangePlan::new(BoundingBox::new(45.0, 44.7, 10.3, 10.0), 10);
/// assert_eq!(plan.ranges().len(), 5);
/// let base = &plan.ranges()[0];
/// assert_eq!(base.tile_count(), 4);
/// assert_eq!(plan.total_tiles(), plan.ranges().iter().map(|r| r.tile_count()).sum::<u64>());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRangePlan {
    ranges: Vec<TileRange>,
}

impl TileRangePlan {
    /// Levels `base_zoom ..= base_zoom + ZOOM_DEPTH`, stopping past [`MAX_ZOOM`].
    pub fn new(bounds: BoundingBox, base_zoom: u8) -> Self {
        let ranges = (0..=ZOOM_DEPTH)
            .map_while(|offset| {
                let zoom = base_zoom.checked_add(offset)?;
                (zoom <= MAX_ZOOM).then(|| TileRange::covering(&bounds, zoom, offset))
            })
            .collect();
        Self { ranges }
    }

    /// Per-level rectangles in scan order, base level first.
    pub fn ranges(&self) -> &[TileRange] {
        &self.ranges
    }

    /// Sum of the tile counts of every level; sizes progress reporting.
    pub fn total_tiles(&self) -> u64 {
        self.ranges.iter().map(TileRange::tile_count).sum()
    }
}
