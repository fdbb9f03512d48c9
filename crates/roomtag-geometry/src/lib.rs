//! Geometry for linked room tagging
//!
//! Only two geometric operations are needed to place a room tag:
//! - mapping a point from linked-model space into host space ([`AffineTransform::apply`])
//! - approximating a representative point from a room boundary ([`estimate_centroid`])
//!
//! # Example
//!
//! ```rust
//! use roomtag_geometry::{AffineTransform, OrderedLoop, Point3, estimate_centroid};
//!
//! let link = AffineTransform::translation(10.0, 0.0, 0.0);
//! assert_eq!(link.apply(Point3::new(5.0, 5.0, 0.0)), Point3::new(15.0, 5.0, 0.0));
//!
//! let square = OrderedLoop::from_vertices([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 2.0, 0.0),
//!     Point3::new(0.0, 2.0, 0.0),
//! ]);
//! assert_eq!(estimate_centroid(&square).unwrap(), Point3::new(1.0, 1.0, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod boundary;
mod centroid;
mod error;
mod point;
mod transform;

pub use boundary::{OrderedLoop, Segment};
pub use centroid::estimate_centroid;
pub use error::GeometryError;
pub use point::{Point2, Point3, Vector3};
pub use transform::AffineTransform;

/// Tolerance used for approximate comparisons
pub const EPSILON: f64 = 1e-9;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
