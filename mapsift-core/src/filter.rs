//! Case-insensitive substring filter applied to point form texts.

/// Inclusive or exclusive substring predicate.
///
/// # Examples
/// ```
/// use mapsift_core::TextFilter;
///
/// let include = TextFilter::new("Hut", false);
/// assert!(include.matches("Mountain HUT"));
/// assert!(!include.matches("Church"));
///
/// let exclude = TextFilter::new("hut", true);
/// assert!(!exclude.matches("Mountain HUT"));
/// assert!(TextFilter::new("", true).matches("anything"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextFilter {
    needle: String,
    excludes: bool,
}

impl TextFilter {
    /// Build a filter; `excludes` drops matching text instead of keeping it.
    pub fn new(filter: &str, excludes: bool) -> Self {
        Self {
            needle: filter.to_lowercase(),
            excludes,
        }
    }

    /// Whether the filter is a no-op.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Whether matching text is dropped rather than kept.
    pub const fn excludes(&self) -> bool {
        self.excludes
    }

    /// Whether `text` passes the filter.
    ///
    /// An empty filter passes everything. Otherwise the lower-cased text must
    /// contain the filter (inclusive mode) or must not contain it (exclusive
    /// mode).
    pub fn matches(&self, text: &str) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let contains = text.to_lowercase().contains(&self.needle);
        contains != self.excludes
    }
}
