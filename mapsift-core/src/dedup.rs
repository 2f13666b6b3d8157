//! Content-keyed deduplication across a whole scan.
//!
//! Overlapping zoom levels decode the same features repeatedly; the index
//! collapses them by their content keys so each is stored once per run.

use std::collections::BTreeSet;

/// Ordered sets of point and way keys already emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupIndex {
    points: BTreeSet<String>,
    ways: BTreeSet<String>,
}

impl DedupIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an index with keys exported from an earlier run.
    pub fn from_keys<P, W>(points: P, ways: W) -> Self
    where
        P: IntoIterator<Item = String>,
        W: IntoIterator<Item = String>,
    {
        Self {
            points: points.into_iter().collect(),
            ways: ways.into_iter().collect(),
        }
    }

    /// Record a point key, returning `false` when it was already present.
    pub fn try_add_point(&mut self, key: &str) -> bool {
        try_add(&mut self.points, key)
    }

    /// Record a way key, returning `false` when it was already present.
    pub fn try_add_way(&mut self, key: &str) -> bool {
        try_add(&mut self.ways, key)
    }

    /// Point keys in sorted order.
    pub fn point_keys(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(String::as_str)
    }

    /// Way keys in sorted order.
    pub fn way_keys(&self) -> impl Iterator<Item = &str> {
        self.ways.iter().map(String::as_str)
    }

    /// Number of distinct point keys.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of distinct way keys.
    pub fn way_count(&self) -> usize {
        self.ways.len()
    }
}

fn try_add(set: &mut BTreeSet<String>, key: &str) -> bool {
    if set.contains(key) {
        return false;
    }
    set.insert(key.to_owned())
}
