//! Room boundary loops
//!
//! A boundary is an ordered chain of segments. Curved edges are carried by
//! their endpoints only; the centroid fallback never looks past the start of
//! each segment.

use crate::point::Point3;
use crate::EPSILON;
use serde::{Deserialize, Serialize};

/// One edge of a boundary loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint
    pub start: Point3,
    /// Second endpoint
    pub end: Point3,
}

impl Segment {
    /// Create new segment
    #[inline]
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Segment length
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }
}

/// Ordered chain of connected segments bounding a planar region
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedLoop(Vec<Segment>);

impl OrderedLoop {
    /// Create loop from segments, in order
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Build a closed polygon loop through `vertices`
    ///
    /// The last vertex is joined back to the first. Fewer than two vertices
    /// produce an empty loop.
    #[must_use]
    pub fn from_vertices(vertices: impl IntoIterator<Item = Point3>) -> Self {
        let vertices: Vec<Point3> = vertices.into_iter().collect();
        if vertices.len() < 2 {
            return Self::default();
        }

        let segments = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(&start, &end)| Segment::new(start, end))
            .collect();

        Self(segments)
    }

    /// Segments in loop order
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check loop has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check each segment ends where the next begins, wrapping around
    #[must_use]
    pub fn is_closed(&self) -> bool {
        if self.0.is_empty() {
            return false;
        }

        self.0
            .iter()
            .zip(self.0.iter().cycle().skip(1))
            .all(|(a, b)| a.end.approx_eq(b.start, EPSILON))
    }

    /// Iterate segment start points
    pub fn start_points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.0.iter().map(|s| s.start)
    }
}

impl FromIterator<Segment> for OrderedLoop {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
