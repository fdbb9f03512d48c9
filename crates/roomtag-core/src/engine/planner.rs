//! Pure placement planning
//!
//! Candidate filtering and point computation touch no host state, so they
//! run per `(level, phase)` bucket on a rayon pool. Views sharing a bucket
//! share one plan.

use crate::ids::RoomId;
use crate::matching::{RoomFilter, ViewIndex, ViewKey};
use crate::model::Room;
use rayon::prelude::*;
use rayon::ThreadPool;
use roomtag_geometry::{estimate_centroid, AffineTransform, GeometryError, Point2};

/// Host-space tag point for a room
///
/// Uses the room's location when it is present and finite, otherwise the
/// vertex-average centroid of its boundary. Either point goes through
/// `transform`; only X and Y are kept.
///
/// # Errors
/// - `GeometryError::NoBoundary` if the room has neither location nor boundary
/// - `GeometryError::EmptyBoundary` if the boundary has no segments
/// - `GeometryError::NonFinite` if the resulting point is not finite
pub fn tag_point(room: &Room, transform: &AffineTransform) -> Result<Point2, GeometryError> {
    let local = match room.location.filter(|p| p.is_finite()) {
        Some(location) => location,
        None => {
            let boundary = room.boundary.as_ref().ok_or(GeometryError::NoBoundary)?;
            estimate_centroid(boundary)?
        }
    };

    let point = transform.apply(local).to_plan();
    if point.is_finite() {
        Ok(point)
    } else {
        Err(GeometryError::NonFinite)
    }
}

/// Planned outcome for one candidate room
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PlanEntry {
    /// Tag the room at `point`
    Place { room_id: RoomId, point: Point2 },
    /// No point could be derived
    NoGeometry { room_id: RoomId, error: GeometryError },
}

impl PlanEntry {
    pub(crate) fn room_id(&self) -> RoomId {
        match self {
            Self::Place { room_id, .. } | Self::NoGeometry { room_id, .. } => *room_id,
        }
    }
}

/// Candidates of one bucket, in room enumeration order
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketPlan {
    pub(crate) entries: Vec<PlanEntry>,
}

pub(crate) struct Planner<'a> {
    rooms: &'a [Room],
    filter: RoomFilter<'a>,
    transform: &'a AffineTransform,
}

impl<'a> Planner<'a> {
    pub(crate) fn new(rooms: &'a [Room], filter: RoomFilter<'a>, transform: &'a AffineTransform) -> Self {
        Self {
            rooms,
            filter,
            transform,
        }
    }

    /// One plan per bucket of `index`, in bucket order
    ///
    /// Runs on `pool` when given, otherwise on rayon's global pool.
    pub(crate) fn plan(&self, index: &ViewIndex, pool: Option<&ThreadPool>) -> Vec<BucketPlan> {
        let keys: Vec<&ViewKey> = index.keys().collect();
        let run = || -> Vec<BucketPlan> { keys.par_iter().map(|key| self.plan_bucket(key)).collect() };

        match pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Same result as [`Self::plan`], on the calling thread
    pub(crate) fn plan_sequential(&self, index: &ViewIndex) -> Vec<BucketPlan> {
        index.keys().map(|key| self.plan_bucket(key)).collect()
    }

    fn plan_bucket(&self, key: &ViewKey) -> BucketPlan {
        let entries = self
            .filter
            .candidates(self.rooms, key.level(), key.phase())
            .into_iter()
            .map(|room| match tag_point(room, self.transform) {
                Ok(point) => PlanEntry::Place {
                    room_id: room.id,
                    point,
                },
                Err(error) => PlanEntry::NoGeometry {
                    room_id: room.id,
                    error,
                },
            })
            .collect();

        BucketPlan { entries }
    }
}
