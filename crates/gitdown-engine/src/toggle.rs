//! Toggle region scanning.
//!
//! Splits a document into active and inactive spans using the literal
//! `<!-- gitdown: off -->` and `<!-- gitdown: on -->` markers.

use std::ops::Range;

/// Marker that disables directive processing for the text that follows.
pub const OFF_MARKER: &str = "<!-- gitdown: off -->";

/// Marker that re-enables directive processing for the text that follows.
pub const ON_MARKER: &str = "<!-- gitdown: on -->";

/// A half-open byte span of a document where directive processing is
/// either enabled or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Byte offset where the region starts.
    pub start: usize,
    /// Byte offset one past the end of the region.
    pub end: usize,
    /// Whether directives inside this region are processed.
    pub active: bool,
}

impl Region {
    /// Whether directives inside this region are processed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Byte range covered by the region.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Partition `document` into alternating active and inactive regions.
///
/// Processing starts active. Every off marker switches to inactive and every
/// on marker switches back, without nesting: repeated off markers have no
/// further effect. A marker stays part of the region that precedes it, and
/// markers are never removed from the document.
///
/// The returned regions cover the whole document in order, without gaps, and
/// two adjacent regions never share the same activity.
///
/// # Example
///
/// ```
/// use gitdown_engine::scan_regions;
///
/// let regions = scan_regions("a<!-- gitdown: off -->b<!-- gitdown: on -->c");
/// assert_eq!(regions.len(), 3);
/// assert!(regions[0].is_active());
/// assert!(!regions[1].is_active());
/// assert!(regions[2].is_active());
/// ```
#[must_use]
pub fn scan_regions(document: &str) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut active = true;
    let mut region_start = 0;
    let mut pos = 0;

    while let Some((marker_start, marker_len, turns_on)) = next_marker(document, pos) {
        let marker_end = marker_start + marker_len;

        if turns_on != active {
            regions.push(Region {
                start: region_start,
                end: marker_end,
                active,
            });
            region_start = marker_end;
            active = turns_on;
        }

        pos = marker_end;
    }

    regions.push(Region {
        start: region_start,
        end: document.len(),
        active,
    });

    regions
}

/// Find the next toggle marker at or after `from`.
///
/// Returns the marker offset, its length, and whether it turns processing on.
fn next_marker(document: &str, from: usize) -> Option<(usize, usize, bool)> {
    let rest = &document[from..];
    let off = rest.find(OFF_MARKER).map(|i| (from + i, OFF_MARKER.len(), false));
    let on = rest.find(ON_MARKER).map(|i| (from + i, ON_MARKER.len(), true));

    match (off, on) {
        (Some(off), Some(on)) => Some(if off.0 < on.0 { off } else { on }),
        (off, on) => off.or(on),
    }
}
