//! Geometry errors

use serde::{Deserialize, Serialize};

/// Why no representative point could be derived for a room
///
/// These are per-room conditions; callers record them and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryError {
    /// The room carries no planar boundary at all
    #[error("room has no planar boundary")]
    NoBoundary,

    /// A boundary was found but contains no segments
    #[error("room boundary has no segments")]
    EmptyBoundary,

    /// The computed point is not finite (degenerate source geometry)
    #[error("room point is not finite")]
    NonFinite,
}
