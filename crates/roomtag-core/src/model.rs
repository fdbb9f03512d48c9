//! Document snapshot model
//!
//! Everything here is read once at the start of a run and treated as an
//! immutable snapshot. Levels and phases are identified across documents by
//! name only; ids are never compared between host and linked documents.

use crate::ids::{DocumentRef, LevelId, LinkId, RoomId, ViewId};
use roomtag_geometry::{AffineTransform, OrderedLoop, Point2, Point3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Building level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Element id, local to its document
    pub id: LevelId,
    /// Level name; the cross-document identity
    pub name: String,
}

impl Level {
    /// Create new level
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<LevelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Construction phase, identified by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase {
    /// Phase name
    pub name: String,
}

impl Phase {
    /// Create new phase
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Phase name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Room read from the linked document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Element id in the linked document
    pub id: RoomId,
    /// Room name, for reporting
    #[serde(default)]
    pub name: Option<String>,
    /// Room number, for reporting
    #[serde(default)]
    pub number: Option<String>,
    /// Name of the level the room sits on
    #[serde(default)]
    pub level_name: Option<String>,
    /// Phase the room was created in
    #[serde(default)]
    pub phase: Option<Phase>,
    /// Direct location point, linked-document coordinates
    #[serde(default)]
    pub location: Option<Point3>,
    /// Planar boundary loop, linked-document coordinates
    #[serde(default)]
    pub boundary: Option<OrderedLoop>,
}

impl Room {
    /// Create new room with no attribution or geometry
    #[must_use]
    pub fn new(id: impl Into<RoomId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            number: None,
            level_name: None,
            phase: None,
            location: None,
            boundary: None,
        }
    }

    /// With level name
    #[must_use]
    pub fn on_level(mut self, level: impl Into<String>) -> Self {
        self.level_name = Some(level.into());
        self
    }

    /// With phase
    #[must_use]
    pub fn in_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(Phase::new(phase));
        self
    }

    /// With location point
    #[must_use]
    pub fn with_location(mut self, location: Point3) -> Self {
        self.location = Some(location);
        self
    }

    /// With boundary loop
    #[must_use]
    pub fn with_boundary(mut self, boundary: OrderedLoop) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// With number and name
    #[must_use]
    pub fn named(mut self, number: impl Into<String>, name: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self.name = Some(name.into());
        self
    }

    /// Level name, treating an empty string as absent
    #[inline]
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Phase name, treating an empty string as absent
    #[inline]
    #[must_use]
    pub fn phase_name(&self) -> Option<&str> {
        self.phase.as_ref().map(Phase::name).filter(|s| !s.is_empty())
    }

    /// Human-readable label: "number name", whichever parts are known
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match (self.number.as_deref(), self.name.as_deref()) {
            (Some(number), Some(name)) => Some(format!("{number} {name}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

/// Plan view flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Floor plan
    Floor,
    /// Reflected ceiling plan
    Ceiling,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => f.write_str("floor"),
            Self::Ceiling => f.write_str("ceiling"),
        }
    }
}

/// Plan view in the host document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanView {
    /// Element id in the host document
    pub id: ViewId,
    /// View name, for reporting
    #[serde(default)]
    pub name: String,
    /// Floor or ceiling plan
    pub kind: ViewKind,
    /// Name of the level the view is associated with
    #[serde(default)]
    pub level_name: Option<String>,
    /// Phase the view shows
    #[serde(default)]
    pub phase: Option<Phase>,
}

impl PlanView {
    /// Create new view with no level or phase
    #[must_use]
    pub fn new(id: impl Into<ViewId>, kind: ViewKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            level_name: None,
            phase: None,
        }
    }

    /// Floor plan shorthand
    #[must_use]
    pub fn floor(id: impl Into<ViewId>, name: impl Into<String>) -> Self {
        Self::new(id, ViewKind::Floor, name)
    }

    /// Ceiling plan shorthand
    #[must_use]
    pub fn ceiling(id: impl Into<ViewId>, name: impl Into<String>) -> Self {
        Self::new(id, ViewKind::Ceiling, name)
    }

    /// With level name
    #[must_use]
    pub fn on_level(mut self, level: impl Into<String>) -> Self {
        self.level_name = Some(level.into());
        self
    }

    /// With phase
    #[must_use]
    pub fn in_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(Phase::new(phase));
        self
    }

    /// Level name, treating an empty string as absent
    #[inline]
    #[must_use]
    pub fn level(&self) -> Option<&str> {
        self.level_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Phase name, treating an empty string as absent
    #[inline]
    #[must_use]
    pub fn phase_name(&self) -> Option<&str> {
        self.phase.as_ref().map(Phase::name).filter(|s| !s.is_empty())
    }
}

/// Reference from the host to a linked document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Link instance id in the host
    pub id: LinkId,
    /// Document the link points at
    pub target_document: DocumentRef,
    /// Linked-to-host transform
    #[serde(default)]
    pub transform: AffineTransform,
    /// Name shown to the user; used by link selection
    pub display_name: String,
}

impl Link {
    /// Create new link
    #[must_use]
    pub fn new(
        id: impl Into<LinkId>,
        display_name: impl Into<String>,
        target_document: DocumentRef,
        transform: AffineTransform,
    ) -> Self {
        Self {
            id: id.into(),
            target_document,
            transform,
            display_name: display_name.into(),
        }
    }
}

/// One tag to create: room, through link, in view, at a host-space point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Room being tagged (linked-document id)
    pub room_id: RoomId,
    /// Link the room is seen through
    pub link_id: LinkId,
    /// View receiving the tag
    pub view_id: ViewId,
    /// Tag point in host coordinates
    pub point: Point2,
}
