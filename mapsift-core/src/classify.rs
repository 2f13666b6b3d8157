//! Tag-based classification of decoded features.
//!
//! Points keep every tag: they are rendered into a form text used for
//! display, for text filtering and as part of their identity. Ways are only
//! kept when their tags mark them as roads or (optionally) contour lines.

use geo::Coord;
use serde_json::{Value, json};

use crate::feature::{MicroCoord, RawPoint, RawWay, Tag};

/// Elevation written for points whose elevation is unknown.
pub const UNKNOWN_ELEVATION: f64 = -1.0;

/// Label used when a point carries no tags at all.
pub const DEFAULT_LABEL: &str = "POI";

const ELEVATION_KEY: &str = "elev";
const NAME_KEY: &str = "name";
const HIGHWAY_KEY: &str = "highway";
const CONTOUR_KEY: &str = "contour_ext";

const ROAD_COLOR: &str = "red";
const ROAD_WIDTH: u32 = 6;
const CONTOUR_NAME: &str = "contour";
const CONTOUR_COLOR: &str = "grey";
const CONTOUR_WIDTH: u32 = 2;

/// A point of interest ready to be stored as a note.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPoint {
    /// WGS84 position with `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Parsed `elev` tag; `None` when absent or not numeric.
    pub elevation: Option<f64>,
    /// `name` tag, or an empty label.
    pub label: String,
    /// JSON form text built from every tag.
    pub form: String,
}

impl ClassifiedPoint {
    /// Elevation with the [`UNKNOWN_ELEVATION`] sentinel substituted.
    pub fn elevation_or_unknown(&self) -> f64 {
        self.elevation.unwrap_or(UNKNOWN_ELEVATION)
    }

    /// Identity of the point across a scan: exact coordinates plus form.
    pub fn dedup_key(&self) -> String {
        format!("{}_{}_{}", self.location.x, self.location.y, self.form)
    }
}

/// Classify a point: render its form, pick a label and parse its elevation.
///
/// # Examples
/// ```
/// use mapsift_core::{RawPoint, classify_point, feature::tags};
///
/// let point = RawPoint::new(10.0, 45.0, tags([("elev", "120"), ("name", "X")]));
/// let classified = classify_point(&point);
/// assert_eq!(classified.label, "X");
/// assert_eq!(classified.elevation, Some(120.0));
/// ```
pub fn classify_point(point: &RawPoint) -> ClassifiedPoint {
    let mut elevation = None;
    for (key, value) in &point.tags {
        if key == ELEVATION_KEY {
            // Unparsable and non-finite elevations are ignored rather than
            // rejected.
            if let Some(parsed) = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite())
            {
                elevation = Some(parsed);
            }
        }
    }

    ClassifiedPoint {
        location: point.location,
        elevation,
        label: label_for(&point.tags),
        form: render_form(&point.tags),
    }
}

fn label_for(tags: &[Tag]) -> String {
    tags.iter()
        .find(|(key, _)| key == NAME_KEY)
        .or_else(|| tags.first())
        .map_or_else(|| DEFAULT_LABEL.to_owned(), |(_, value)| value.clone())
}

/// Render the tags as a compact JSON form.
///
/// Items keep decode order and object keys are emitted in sorted order, so
/// the same tags always produce the same text.
pub fn render_form(tags: &[Tag]) -> String {
    let items: Vec<Value> = tags
        .iter()
        .map(|(key, value)| json!({ "key": key, "value": value, "type": "string" }))
        .collect();
    json!({
        "sectionname": DEFAULT_LABEL,
        "forms": [{ "formname": "tags", "formitems": items }],
    })
    .to_string()
}

/// A way kept as a road or contour line.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedWay<'a> {
    /// Track name: the highway class or `contour`.
    pub name: String,
    /// Line colour for the road class.
    pub color: &'static str,
    /// Line width for the road class.
    pub width: u32,
    /// Carries a `highway` tag.
    pub is_road: bool,
    /// Carries a `contour` tag.
    pub is_contour: bool,
    /// Sub-paths borrowed from the decoded way.
    pub paths: &'a [Vec<MicroCoord>],
}

impl ClassifiedWay<'_> {
    /// Identity of the way: its name plus its first raw node.
    ///
    /// Returns `None` for ways without any node.
    pub fn dedup_key(&self) -> Option<String> {
        let first = self.paths.iter().find_map(|path| path.first())?;
        Some(format!("{}_{}_{}", self.name, first.x, first.y))
    }
}

/// Classify a way, returning `None` unless it is a road or an enabled
/// contour line.
///
/// A `highway` tag marks a road and names it when no name is known yet; a
/// `name` tag always wins (last one seen). Contours take a fixed
/// presentation that overrides any road name.
pub fn classify_way(way: &RawWay, include_contours: bool) -> Option<ClassifiedWay<'_>> {
    let mut is_road = false;
    let mut is_contour = false;
    let mut name: Option<&str> = None;
    for (key, value) in &way.tags {
        match key.as_str() {
            HIGHWAY_KEY => {
                is_road = true;
                name.get_or_insert(value.as_str());
            }
            NAME_KEY => name = Some(value.as_str()),
            CONTOUR_KEY if include_contours => is_contour = true,
            _ => {}
        }
    }

    if is_contour {
        return Some(ClassifiedWay {
            name: CONTOUR_NAME.to_owned(),
            color: CONTOUR_COLOR,
            width: CONTOUR_WIDTH,
            is_road,
            is_contour,
            paths: &way.paths,
        });
    }
    if !is_road {
        return None;
    }
    Some(ClassifiedWay {
        name: name.unwrap_or(HIGHWAY_KEY).to_owned(),
        color: ROAD_COLOR,
        width: ROAD_WIDTH,
        is_road,
        is_contour,
        paths: &way.paths,
    })
}
