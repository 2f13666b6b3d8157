use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::BoundingBox;

/// Parameters of one extraction run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionOptions {
    /// Area to extract; points outside it are discarded.
    pub bounds: BoundingBox,
    /// Base zoom level of the scan.
    pub zoom: u8,
    /// Extract points of interest as notes.
    pub pois: bool,
    /// Extract roads (and contours, see `contours`) as tracks.
    pub ways: bool,
    /// Treat contour lines as ways worth extracting.
    pub contours: bool,
    /// Substring matched case-insensitively against point forms.
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter_text: String,
    /// Drop matching points instead of keeping only them.
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter_excludes: bool,
}

impl ExtractionOptions {
    /// Options extracting points only, with no text filter.
    #[must_use]
    pub const fn points(bounds: BoundingBox, zoom: u8) -> Self {
        Self {
            bounds,
            zoom,
            pois: true,
            ways: false,
            contours: false,
            filter_text: String::new(),
            filter_excludes: false,
        }
    }

    /// Whether the run has anything to do.
    #[must_use]
    pub const fn requests_anything(&self) -> bool {
        self.pois || self.ways
    }
}

/// Shared flag requesting that a running extraction stop.
///
/// The engine checks the flag before decoding each tile.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Flag in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running scan to stop before its next tile.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`CancelFlag::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
