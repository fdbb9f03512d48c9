//! Run diagnostics and the final report
//!
//! [`Diagnostics`] is filled in while a run progresses and turned into an
//! immutable [`RunReport`] when the run reaches a terminal phase.

use crate::error::{AbortReason, PlacementError};
use crate::ids::{DocumentRef, LinkId, RoomId, RunId, TagId, ViewId};
use crate::model::{Link, PlanView, Room, ViewKind};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use roomtag_geometry::{GeometryError, Point2};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// What went wrong for one room
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The room's level is missing or not shared with the host
    NoMatchingLevel {
        /// Level name on the room, if any
        level: Option<String>,
    },
    /// The room is on a shared level but no view accepted it
    NoCandidateView,
    /// No representative point could be derived
    NoUsableGeometry {
        /// Geometry condition
        error: GeometryError,
    },
    /// The host rejected the tag
    PlacementFailed {
        /// Host error
        cause: PlacementError,
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingLevel { level: Some(level) } => {
                write!(f, "level \"{level}\" not present in host")
            }
            Self::NoMatchingLevel { level: None } => f.write_str("room has no level"),
            Self::NoCandidateView => f.write_str("no plan view matches the room's level and phase"),
            Self::NoUsableGeometry { error } => write!(f, "no usable geometry: {error}"),
            Self::PlacementFailed { cause } => write!(f, "tag placement failed: {cause}"),
        }
    }
}

/// One per-room problem, optionally scoped to a view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Room concerned
    pub room_id: RoomId,
    /// Room number and name, when known
    pub room_label: Option<String>,
    /// View concerned, for view-scoped issues
    pub view_id: Option<ViewId>,
    /// What happened
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    /// Check if the host rejected a placement
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, IssueKind::PlacementFailed { .. })
    }

    /// Check if the room was skipped without asking the host
    #[inline]
    #[must_use]
    pub fn is_skip(&self) -> bool {
        !self.is_failure()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {}", self.room_id)?;
        if let Some(label) = &self.room_label {
            write!(f, " ({label})")?;
        }
        if let Some(view) = self.view_id {
            write!(f, " in view {view}")?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// Per-view counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewOutcome {
    /// View id
    pub view_id: ViewId,
    /// View name
    pub name: String,
    /// Floor or ceiling
    pub kind: ViewKind,
    /// Level the view shows
    pub level_name: Option<String>,
    /// Phase the view shows
    pub phase_name: Option<String>,
    /// Rooms that passed the filter
    pub candidates: usize,
    /// Tags created
    pub placed: usize,
    /// Tags that would be created (dry run)
    pub planned: usize,
    /// Candidates without usable geometry
    pub skipped: usize,
    /// Placements the host rejected
    pub failed: usize,
    /// Candidates already handled for this view
    pub duplicates: usize,
}

/// Per-room summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomOutcome {
    /// Room id
    pub room_id: RoomId,
    /// Room number and name, when known
    pub label: Option<String>,
    /// Level the room sits on
    pub level_name: Option<String>,
    /// Views that received (or, in a dry run, would receive) a tag
    pub tagged_views: Vec<ViewId>,
    /// Skip issues recorded for the room
    pub skipped: usize,
    /// Failure issues recorded for the room
    pub failed: usize,
}

/// One tag created or planned
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Room tagged
    pub room_id: RoomId,
    /// View receiving the tag
    pub view_id: ViewId,
    /// Tag point, host coordinates
    pub point: Point2,
    /// Created tag; `None` in a dry run
    pub tag_id: Option<TagId>,
}

/// Link a run reconciled against
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    /// Link instance id
    pub id: LinkId,
    /// Link display name
    pub display_name: String,
    /// Linked document handle
    pub document: DocumentRef,
}

impl From<&Link> for LinkSummary {
    fn from(link: &Link) -> Self {
        Self {
            id: link.id,
            display_name: link.display_name.clone(),
            document: link.target_document.clone(),
        }
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// Reached `Done`; per-room skips and failures may still exist
    Succeeded,
    /// Stopped by a fatal condition; no tags were kept
    Aborted {
        /// Fatal condition
        reason: AbortReason,
    },
}

impl RunStatus {
    /// Check if the run succeeded
    #[inline]
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Aborted { reason } => write!(f, "aborted ({reason})"),
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Run id
    pub run_id: RunId,
    /// Terminal status
    #[serde(flatten)]
    pub status: RunStatus,
    /// Run planned placements only
    pub dry_run: bool,
    /// Selected link
    pub link: Option<LinkSummary>,
    /// Level names shared by host and linked document
    pub matching_levels: BTreeSet<String>,
    /// Per-view counters, in view enumeration order
    pub views: Vec<ViewOutcome>,
    /// Per-room summaries, in linked enumeration order
    pub rooms: Vec<RoomOutcome>,
    /// Skips and failures, in the order they were recorded
    pub issues: Vec<Issue>,
    /// Tags created or planned, in placement order
    pub placements: Vec<Placement>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Check if the run succeeded
    #[inline]
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status.is_succeeded()
    }

    /// Fatal condition, if the run aborted
    #[must_use]
    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match &self.status {
            RunStatus::Succeeded => None,
            RunStatus::Aborted { reason } => Some(reason),
        }
    }

    /// Number of tags created in the host
    #[must_use]
    pub fn tags_created(&self) -> usize {
        self.placements.iter().filter(|p| p.tag_id.is_some()).count()
    }

    /// Number of placements computed in a dry run
    #[must_use]
    pub fn tags_planned(&self) -> usize {
        self.placements.iter().filter(|p| p.tag_id.is_none()).count()
    }

    /// Skip issues
    pub fn skips(&self) -> impl Iterator<Item = &Issue> + '_ {
        self.issues.iter().filter(|i| i.is_skip())
    }

    /// Failure issues
    pub fn failures(&self) -> impl Iterator<Item = &Issue> + '_ {
        self.issues.iter().filter(|i| i.is_failure())
    }

    /// Issues recorded for one room
    pub fn issues_for(&self, room: RoomId) -> impl Iterator<Item = &Issue> + '_ {
        self.issues.iter().filter(move |i| i.room_id == room)
    }

    /// Summary of one room
    #[must_use]
    pub fn room(&self, room: RoomId) -> Option<&RoomOutcome> {
        self.rooms.iter().find(|r| r.room_id == room)
    }

    /// Counters of one view
    #[must_use]
    pub fn view(&self, view: ViewId) -> Option<&ViewOutcome> {
        self.views.iter().find(|v| v.view_id == view)
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    /// Serialization errors from `serde_json`.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run {}: {}", self.run_id, self.status)?;
        if !self.is_succeeded() {
            return Ok(());
        }
        if self.dry_run {
            write!(f, ", {} tags planned", self.tags_planned())?;
        } else {
            write!(f, ", {} tags placed", self.tags_created())?;
        }
        write!(
            f,
            ", {} skipped, {} failed across {} views",
            self.skips().count(),
            self.failures().count(),
            self.views.len()
        )
    }
}

/// Accumulates outcomes while a run progresses
#[derive(Debug)]
pub struct Diagnostics {
    run_id: RunId,
    dry_run: bool,
    started_at: DateTime<Utc>,
    link: Option<LinkSummary>,
    matching_levels: BTreeSet<String>,
    views: Vec<ViewOutcome>,
    view_slots: HashMap<ViewId, usize>,
    rooms: IndexMap<RoomId, RoomOutcome>,
    issues: Vec<Issue>,
    placements: Vec<Placement>,
}

impl Diagnostics {
    /// Start collecting for a run
    #[must_use]
    pub fn new(run_id: RunId, dry_run: bool) -> Self {
        Self {
            run_id,
            dry_run,
            started_at: Utc::now(),
            link: None,
            matching_levels: BTreeSet::new(),
            views: Vec::new(),
            view_slots: HashMap::new(),
            rooms: IndexMap::new(),
            issues: Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Record the selected link
    pub fn set_link(&mut self, link: &Link) {
        self.link = Some(LinkSummary::from(link));
    }

    /// Record the matching level set
    pub fn set_matching_levels(&mut self, levels: BTreeSet<String>) {
        self.matching_levels = levels;
    }

    /// Track a linked room
    pub fn register_room(&mut self, room: &Room) {
        self.rooms.entry(room.id).or_insert_with(|| RoomOutcome {
            room_id: room.id,
            label: room.label(),
            level_name: room.level().map(str::to_string),
            tagged_views: Vec::new(),
            skipped: 0,
            failed: 0,
        });
    }

    /// Track a host view and its candidate count
    pub fn register_view(&mut self, view: &PlanView, candidates: usize) {
        let slot = self.views.len();
        self.views.push(ViewOutcome {
            view_id: view.id,
            name: view.name.clone(),
            kind: view.kind,
            level_name: view.level().map(str::to_string),
            phase_name: view.phase_name().map(str::to_string),
            candidates,
            placed: 0,
            planned: 0,
            skipped: 0,
            failed: 0,
            duplicates: 0,
        });
        self.view_slots.insert(view.id, slot);
    }

    /// Room is on no shared level
    pub fn no_matching_level(&mut self, room: RoomId) {
        let level = self.rooms.get(&room).and_then(|r| r.level_name.clone());
        self.push_issue(room, None, IssueKind::NoMatchingLevel { level });
    }

    /// Room is on a shared level but was never a candidate
    pub fn no_candidate_view(&mut self, room: RoomId) {
        self.push_issue(room, None, IssueKind::NoCandidateView);
    }

    /// Candidate had no usable geometry for `view`
    pub fn no_usable_geometry(&mut self, room: RoomId, view: ViewId, error: GeometryError) {
        if let Some(outcome) = self.view_mut(view) {
            outcome.skipped += 1;
        }
        self.push_issue(room, Some(view), IssueKind::NoUsableGeometry { error });
    }

    /// Host rejected the tag for `room` in `view`
    pub fn placement_failed(&mut self, room: RoomId, view: ViewId, cause: PlacementError) {
        if let Some(outcome) = self.view_mut(view) {
            outcome.failed += 1;
        }
        self.push_issue(room, Some(view), IssueKind::PlacementFailed { cause });
    }

    /// `(room, view)` was already handled this run
    pub fn duplicate(&mut self, view: ViewId) {
        if let Some(outcome) = self.view_mut(view) {
            outcome.duplicates += 1;
        }
    }

    /// Tag created
    pub fn placed(&mut self, room: RoomId, view: ViewId, point: Point2, tag: TagId) {
        if let Some(outcome) = self.view_mut(view) {
            outcome.placed += 1;
        }
        self.push_placement(room, view, point, Some(tag));
    }

    /// Tag planned (dry run)
    pub fn planned(&mut self, room: RoomId, view: ViewId, point: Point2) {
        if let Some(outcome) = self.view_mut(view) {
            outcome.planned += 1;
        }
        self.push_placement(room, view, point, None);
    }

    /// Forget placements after the host discarded them
    pub fn roll_back(&mut self) {
        self.placements.clear();
        for view in &mut self.views {
            view.placed = 0;
        }
        for room in self.rooms.values_mut() {
            room.tagged_views.clear();
        }
    }

    /// Placements recorded so far
    #[inline]
    #[must_use]
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Close the run with `status`
    #[must_use]
    pub fn finish(self, status: RunStatus) -> RunReport {
        RunReport {
            run_id: self.run_id,
            status,
            dry_run: self.dry_run,
            link: self.link,
            matching_levels: self.matching_levels,
            views: self.views,
            rooms: self.rooms.into_values().collect(),
            issues: self.issues,
            placements: self.placements,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }

    fn view_mut(&mut self, view: ViewId) -> Option<&mut ViewOutcome> {
        let slot = *self.view_slots.get(&view)?;
        self.views.get_mut(slot)
    }

    fn push_placement(&mut self, room: RoomId, view: ViewId, point: Point2, tag_id: Option<TagId>) {
        if let Some(outcome) = self.rooms.get_mut(&room) {
            outcome.tagged_views.push(view);
        }
        self.placements.push(Placement {
            room_id: room,
            view_id: view,
            point,
            tag_id,
        });
    }

    fn push_issue(&mut self, room: RoomId, view: Option<ViewId>, kind: IssueKind) {
        let room_label = match self.rooms.get_mut(&room) {
            Some(outcome) => {
                if matches!(kind, IssueKind::PlacementFailed { .. }) {
                    outcome.failed += 1;
                } else {
                    outcome.skipped += 1;
                }
                outcome.label.clone()
            }
            None => None,
        };

        let issue = Issue {
            room_id: room,
            room_label,
            view_id: view,
            kind,
        };
        tracing::debug!(room = %issue.room_id, view = ?issue.view_id, "{}", issue.kind);
        self.issues.push(issue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collector() -> Diagnostics {
        let mut d = Diagnostics::new(RunId::new(), false);
        d.register_room(&Room::new(1).on_level("Level 1").named("101", "Office"));
        d.register_room(&Room::new(2).on_level("Roof"));
        d.register_view(&PlanView::floor(10, "L1").on_level("Level 1"), 1);
        d
    }

    #[test]
    fn counts_flow_into_view_and_room() {
        let mut d = collector();
        d.placed(RoomId::new(1), ViewId::new(10), Point2::new(1.0, 2.0), TagId::new(500));
        d.duplicate(ViewId::new(10));
        d.no_matching_level(RoomId::new(2));

        let report = d.finish(RunStatus::Succeeded);
        let view = report.view(ViewId::new(10)).unwrap();
        assert_eq!((view.placed, view.duplicates), (1, 1));
        assert_eq!(report.room(RoomId::new(1)).unwrap().tagged_views, vec![ViewId::new(10)]);
        assert_eq!(report.room(RoomId::new(2)).unwrap().skipped, 1);
        assert_eq!(report.tags_created(), 1);
        assert_eq!(report.skips().count(), 1);
    }

    #[test]
    fn issues_carry_room_labels() {
        let mut d = collector();
        d.placement_failed(RoomId::new(1), ViewId::new(10), PlacementError::host("locked"));

        let report = d.finish(RunStatus::Succeeded);
        let issue = report.failures().next().unwrap();
        assert_eq!(issue.room_label.as_deref(), Some("101 Office"));
        assert_eq!(
            issue.to_string(),
            "room 1 (101 Office) in view 10: tag placement failed: host error: locked"
        );
    }

    #[test]
    fn no_matching_level_names_the_level() {
        let mut d = collector();
        d.no_matching_level(RoomId::new(2));
        let report = d.finish(RunStatus::Succeeded);
        assert_eq!(
            report.issues[0].kind,
            IssueKind::NoMatchingLevel {
                level: Some("Roof".to_string())
            }
        );
    }

    #[test]
    fn roll_back_drops_placements_keeps_issues() {
        let mut d = collector();
        d.placed(RoomId::new(1), ViewId::new(10), Point2::new(0.0, 0.0), TagId::new(1));
        d.no_matching_level(RoomId::new(2));
        d.roll_back();

        assert_eq!(d.placement_count(), 0);
        let report = d.finish(RunStatus::Succeeded);
        assert_eq!(report.view(ViewId::new(10)).unwrap().placed, 0);
        assert!(report.room(RoomId::new(1)).unwrap().tagged_views.is_empty());
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn summary_line() {
        let mut d = collector();
        d.placed(RoomId::new(1), ViewId::new(10), Point2::new(0.0, 0.0), TagId::new(1));
        let report = d.finish(RunStatus::Succeeded);
        let summary = report.to_string();
        assert!(summary.ends_with("succeeded, 1 tags placed, 0 skipped, 0 failed across 1 views"));
    }

    #[test]
    fn json_flattens_status_and_issue_kind() {
        let mut d = Diagnostics::new(RunId::new(), true);
        d.register_room(&Room::new(3).on_level("Level 1"));
        d.register_view(&PlanView::ceiling(11, "RCP"), 1);
        d.no_usable_geometry(RoomId::new(3), ViewId::new(11), GeometryError::NoBoundary);
        let report = d.finish(RunStatus::Succeeded);

        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["issues"][0]["kind"], "no_usable_geometry");
        assert_eq!(json["issues"][0]["error"], "no_boundary");
        assert_eq!(json["views"][0]["kind"], "ceiling");
    }

    #[test]
    fn aborted_report_exposes_reason() {
        let d = Diagnostics::new(RunId::new(), false);
        let report = d.finish(RunStatus::Aborted {
            reason: AbortReason::InvalidConfig {
                message: "bad".to_string(),
            },
        });
        assert!(!report.is_succeeded());
        assert!(report.abort_reason().is_some());
        assert!(report.to_string().contains("aborted (invalid configuration: bad)"));
    }
}
