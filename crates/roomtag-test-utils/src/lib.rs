//! Testing utilities for the roomtag workspace
//!
//! In-memory host and linked documents, fixture builders and JSON snapshots.

#![allow(missing_docs)]

use roomtag_core::{
    DocumentRef, HostDocument, Level, Link, LinkId, LinkedDocument, PlacementError,
    PlacementRequest, PlanView, Room, RoomId, TagId, TagPlacer, TransactionError, Transactional,
    ViewId, ViewKind,
};
use roomtag_geometry::{AffineTransform, OrderedLoop, Point2, Point3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Tag created in an [`InMemoryHost`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatedTag {
    pub tag_id: TagId,
    pub room_id: RoomId,
    pub link_id: LinkId,
    pub view_id: ViewId,
    pub point: Point2,
}

/// Transaction calls seen by an [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Begin(String),
    Commit,
    Rollback,
}

/// Host document kept in memory
///
/// Tags created inside a transaction are staged and only become visible in
/// [`InMemoryHost::tags`] after a successful commit.
#[derive(Debug, Clone)]
pub struct InMemoryHost {
    pub document: DocumentRef,
    pub links: Vec<Link>,
    pub levels: Vec<Level>,
    pub views: Vec<PlanView>,
    tags: Vec<CreatedTag>,
    staged: Option<Vec<CreatedTag>>,
    events: Vec<HostEvent>,
    placement_calls: usize,
    failing_rooms: HashSet<RoomId>,
    reject_begin: bool,
    reject_commit: bool,
    next_tag: i64,
}

impl InMemoryHost {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: DocumentRef::new(document),
            links: Vec::new(),
            levels: Vec::new(),
            views: Vec::new(),
            tags: Vec::new(),
            staged: None,
            events: Vec::new(),
            placement_calls: 0,
            failing_rooms: HashSet::new(),
            reject_begin: false,
            reject_commit: false,
            next_tag: 9_000,
        }
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_levels<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let start = 100 + self.levels.len();
        self.levels.extend(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Level::new(i64::try_from(start + i).unwrap_or_default(), name)),
        );
        self
    }

    pub fn with_view(mut self, view: PlanView) -> Self {
        self.views.push(view);
        self
    }

    /// Every `create_tag` for `room` fails
    pub fn fail_room(mut self, room: impl Into<RoomId>) -> Self {
        self.failing_rooms.insert(room.into());
        self
    }

    /// `begin` is refused
    pub fn reject_begin(mut self) -> Self {
        self.reject_begin = true;
        self
    }

    /// `commit` is refused
    pub fn reject_commit(mut self) -> Self {
        self.reject_commit = true;
        self
    }

    /// Committed tags, in creation order
    pub fn tags(&self) -> &[CreatedTag] {
        &self.tags
    }

    /// Committed tags in one view
    pub fn tags_in(&self, view: impl Into<ViewId>) -> Vec<CreatedTag> {
        let view = view.into();
        self.tags.iter().filter(|t| t.view_id == view).copied().collect()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Number of `create_tag` calls, successful or not
    pub fn placement_calls(&self) -> usize {
        self.placement_calls
    }

    /// No transaction was opened and no tag exists
    pub fn is_untouched(&self) -> bool {
        self.tags.is_empty() && self.events.is_empty() && self.placement_calls == 0
    }
}

impl HostDocument for InMemoryHost {
    fn document(&self) -> DocumentRef {
        self.document.clone()
    }

    fn list_links(&self) -> Vec<Link> {
        self.links.clone()
    }

    fn list_levels(&self) -> Vec<Level> {
        self.levels.clone()
    }

    fn list_plan_views(&self, kinds: &[ViewKind]) -> Vec<PlanView> {
        self.views
            .iter()
            .filter(|view| kinds.contains(&view.kind))
            .cloned()
            .collect()
    }
}

impl TagPlacer for InMemoryHost {
    fn create_tag(&mut self, link: &Link, request: &PlacementRequest) -> Result<TagId, PlacementError> {
        self.placement_calls += 1;

        if self.failing_rooms.contains(&request.room_id) {
            return Err(PlacementError::host(format!("room {} is locked", request.room_id)));
        }
        if !request.point.is_finite() {
            return Err(PlacementError::InvalidPoint { point: request.point });
        }
        let Some(staged) = self.staged.as_mut() else {
            return Err(PlacementError::host("no open transaction"));
        };

        self.next_tag += 1;
        let tag_id = TagId::new(self.next_tag);
        staged.push(CreatedTag {
            tag_id,
            room_id: request.room_id,
            link_id: link.id,
            view_id: request.view_id,
            point: request.point,
        });
        Ok(tag_id)
    }
}

impl Transactional for InMemoryHost {
    fn begin(&mut self, label: &str) -> Result<(), TransactionError> {
        if self.reject_begin {
            return Err(TransactionError::Begin {
                label: label.to_string(),
                message: "document is read-only".to_string(),
            });
        }
        self.events.push(HostEvent::Begin(label.to_string()));
        self.staged = Some(Vec::new());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), TransactionError> {
        if self.reject_commit {
            return Err(TransactionError::Commit("host reported warnings".to_string()));
        }
        self.events.push(HostEvent::Commit);
        if let Some(staged) = self.staged.take() {
            self.tags.extend(staged);
        }
        Ok(())
    }

    fn rollback(&mut self) {
        self.events.push(HostEvent::Rollback);
        self.staged = None;
    }
}

/// Linked document kept in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryLinkedDocument {
    pub document: DocumentRef,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl InMemoryLinkedDocument {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: DocumentRef::new(document),
            levels: Vec::new(),
            rooms: Vec::new(),
        }
    }

    pub fn with_levels<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let start = self.levels.len();
        self.levels.extend(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Level::new(i64::try_from(start + i).unwrap_or_default() + 1, name)),
        );
        self
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    pub fn with_rooms(mut self, rooms: impl IntoIterator<Item = Room>) -> Self {
        self.rooms.extend(rooms);
        self
    }
}

impl LinkedDocument for InMemoryLinkedDocument {
    fn document(&self) -> DocumentRef {
        self.document.clone()
    }

    fn list_levels(&self) -> Vec<Level> {
        self.levels.clone()
    }

    fn list_rooms(&self) -> Vec<Room> {
        self.rooms.clone()
    }
}

/// Link to `document` named `name`
pub fn link(id: i64, name: &str, document: &str, transform: AffineTransform) -> Link {
    Link::new(id, name, DocumentRef::new(document), transform)
}

/// Axis-aligned square boundary with its lower-left corner at `(x, y)`
pub fn square_boundary(x: f64, y: f64, size: f64) -> OrderedLoop {
    OrderedLoop::from_vertices([
        Point3::new(x, y, 0.0),
        Point3::new(x + size, y, 0.0),
        Point3::new(x + size, y + size, 0.0),
        Point3::new(x, y + size, 0.0),
    ])
}

/// Room with a location point
pub fn room_at(id: i64, level: &str, phase: &str, x: f64, y: f64) -> Room {
    Room::new(id)
        .on_level(level)
        .in_phase(phase)
        .with_location(Point3::new(x, y, 0.0))
}

/// Room with only a boundary
pub fn room_bounded(id: i64, level: &str, phase: &str, boundary: OrderedLoop) -> Room {
    Room::new(id).on_level(level).in_phase(phase).with_boundary(boundary)
}

/// Room with level and phase but no geometry
pub fn room_without_geometry(id: i64, level: &str, phase: &str) -> Room {
    Room::new(id).on_level(level).in_phase(phase)
}

/// Host part of a [`Snapshot`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub document: DocumentRef,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub views: Vec<PlanView>,
    #[serde(default)]
    pub failing_rooms: Vec<RoomId>,
}

/// Host and linked documents captured as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub host: HostSnapshot,
    #[serde(default)]
    pub linked: Vec<InMemoryLinkedDocument>,
}

impl Snapshot {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Documents ready for a run
    pub fn into_documents(self) -> (InMemoryHost, Vec<InMemoryLinkedDocument>) {
        let HostSnapshot {
            document,
            links,
            levels,
            views,
            failing_rooms,
        } = self.host;

        let mut host = InMemoryHost::new(document.as_str());
        host.links = links;
        host.levels = levels;
        host.views = views;
        host.failing_rooms = failing_rooms.into_iter().collect();

        (host, self.linked)
    }
}

/// Path of a file under `fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

/// Load a snapshot from `fixtures/`
///
/// # Panics
/// If the fixture is missing or malformed.
pub fn load_snapshot(name: &str) -> Snapshot {
    let path = fixture_path(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
    Snapshot::from_json_str(&text)
        .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
}
