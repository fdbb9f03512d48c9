//! Boundary centroid fallback
//!
//! Used only when a room has no location point. The estimate is the plain
//! average of each segment's first endpoint, so it leans toward stretches of
//! the boundary with dense vertices. It is not an area centroid.

use crate::boundary::OrderedLoop;
use crate::error::GeometryError;
use crate::point::{Point3, Vector3};

/// Average the first endpoint of every segment in `boundary`
///
/// # Errors
/// - [`GeometryError::EmptyBoundary`] if the loop has no segments
/// - [`GeometryError::NonFinite`] if the vertices produce a non-finite average
pub fn estimate_centroid(boundary: &OrderedLoop) -> Result<Point3, GeometryError> {
    let count = boundary.len();
    if count == 0 {
        return Err(GeometryError::EmptyBoundary);
    }

    let sum = boundary
        .start_points()
        .fold(Vector3::ZERO, |acc, p| acc + p.to_vector());

    #[allow(clippy::cast_precision_loss)]
    let centroid = Point3::ORIGIN + sum / count as f64;

    if centroid.is_finite() {
        Ok(centroid)
    } else {
        Err(GeometryError::NonFinite)
    }
}
