//! JSON encoding of a tile's `tile_data` blob.
//!
//! ```json
//! {"points": [{"lon": 10.0, "lat": 45.0, "tags": [["name", "X"]]}],
//!  "ways": [{"tags": [["highway", "track"]], "nodes": [[10000000, 45000000, 10100000, 45100000]]}]}
//! ```
//!
//! Way nodes are flat `x, y` pairs in micro-degrees, one array per
//! sub-path. A trailing unpaired value is ignored.

use mapsift_core::{MicroCoord, RawPoint, RawWay, Tag, TileFeatures};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct TilePayload {
    #[serde(default)]
    points: Vec<PointPayload>,
    #[serde(default)]
    ways: Vec<WayPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointPayload {
    lon: f64,
    lat: f64,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WayPayload {
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    nodes: Vec<Vec<i32>>,
}

impl From<TilePayload> for TileFeatures {
    fn from(payload: TilePayload) -> Self {
        Self {
            points: payload
                .points
                .into_iter()
                .map(|point| RawPoint::new(point.lon, point.lat, point.tags))
                .collect(),
            ways: payload
                .ways
                .into_iter()
                .map(|way| RawWay::new(way.tags, way.nodes.iter().map(|path| pairs(path)).collect()))
                .collect(),
        }
    }
}

impl From<&TileFeatures> for TilePayload {
    fn from(features: &TileFeatures) -> Self {
        Self {
            points: features
                .points
                .iter()
                .map(|point| PointPayload {
                    lon: point.location.x,
                    lat: point.location.y,
                    tags: point.tags.clone(),
                })
                .collect(),
            ways: features
                .ways
                .iter()
                .map(|way| WayPayload {
                    tags: way.tags.clone(),
                    nodes: way
                        .paths
                        .iter()
                        .map(|path| path.iter().flat_map(|node| [node.x, node.y]).collect())
                        .collect(),
                })
                .collect(),
        }
    }
}

fn pairs(flat: &[i32]) -> Vec<MicroCoord> {
    flat.chunks_exact(2)
        .filter_map(|pair| match *pair {
            [x, y] => Some(MicroCoord::new(x, y)),
            _ => None,
        })
        .collect()
}
