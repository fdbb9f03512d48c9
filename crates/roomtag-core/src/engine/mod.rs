//! Reconciliation engine
//!
//! One call to [`ReconciliationEngine::run`] walks the run through
//! `Init -> LinkSelected -> LevelsMatched -> PerViewProcessing -> Done`:
//! 1. pick the link and resolve its document
//! 2. intersect host and linked level names
//! 3. index host plan views, plan every bucket in parallel
//! 4. apply the plans sequentially, in view order, inside one host transaction
//!
//! Only fatal conditions abort. Rooms without geometry and placements the
//! host rejects are recorded in the report and processing continues.

mod planner;

pub use planner::tag_point;

use crate::config::ReconcileConfig;
use crate::diagnostics::{Diagnostics, RunReport, RunStatus};
use crate::error::{AbortReason, TransactionError};
use crate::host::{run_in_transaction, HostDocument, LinkedSources, TagPlacer, Transactional};
use crate::ids::{RoomId, RunId, ViewId};
use crate::matching::{matching_levels, select_link, RoomFilter, ViewIndex};
use crate::model::{Link, PlacementRequest};
use crate::run_state::{RunPhase, RunState};
use planner::{BucketPlan, PlanEntry, Planner};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Run one reconciliation with `config`
///
/// Shorthand for `ReconciliationEngine::new(config).run(host, linked)`.
pub fn run_reconciliation<H, L>(host: &mut H, linked: &L, config: &ReconcileConfig) -> RunReport
where
    H: HostDocument + TagPlacer + Transactional + ?Sized,
    L: LinkedSources + ?Sized,
{
    ReconciliationEngine::new(config).run(host, linked)
}

/// Drives reconciliation runs for one configuration
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine<'c> {
    config: &'c ReconcileConfig,
}

impl<'c> ReconciliationEngine<'c> {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(config: &'c ReconcileConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReconcileConfig {
        self.config
    }

    /// Reconcile `host` against the selected link's document in `linked`
    ///
    /// Never fails: fatal conditions come back as
    /// [`RunStatus::Aborted`](crate::diagnostics::RunStatus) with the host
    /// left as it was.
    pub fn run<H, L>(&self, host: &mut H, linked: &L) -> RunReport
    where
        H: HostDocument + TagPlacer + Transactional + ?Sized,
        L: LinkedSources + ?Sized,
    {
        let run_id = RunId::new();
        let span = tracing::info_span!("reconcile", run_id = %run_id);
        let _enter = span.enter();

        info!(
            host = %host.document(),
            dry_run = self.config.dry_run,
            mode = ?self.config.match_mode,
            "reconciliation started"
        );

        let mut state = RunState::new();
        let mut diagnostics = Diagnostics::new(run_id, self.config.dry_run);

        let status = match self.execute(host, linked, &mut state, &mut diagnostics) {
            Ok(()) => {
                enter(&mut state, RunPhase::Done);
                RunStatus::Succeeded
            }
            Err(reason) => {
                warn!(phase = %state.phase(), %reason, "reconciliation aborted");
                enter(&mut state, RunPhase::Aborted);
                RunStatus::Aborted { reason }
            }
        };

        let report = diagnostics.finish(status);
        info!(summary = %report, "reconciliation finished");
        report
    }

    fn execute<H, L>(
        &self,
        host: &mut H,
        linked: &L,
        state: &mut RunState,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), AbortReason>
    where
        H: HostDocument + TagPlacer + Transactional + ?Sized,
        L: LinkedSources + ?Sized,
    {
        self.config.validate()?;

        let links = host.list_links();
        let link = select_link(&links, self.config.link_name_filter.as_deref())?;
        enter(state, RunPhase::LinkSelected);
        diagnostics.set_link(link);
        info!(link = %link.id, name = %link.display_name, document = %link.target_document, "link selected");

        let document = linked
            .resolve(&link.target_document)
            .ok_or_else(|| AbortReason::LinkedDocumentUnavailable {
                link: link.display_name.clone(),
                document: link.target_document.clone(),
            })?;
        debug_assert!(
            link.transform.is_finite(),
            "link {} has a non-finite transform",
            link.id
        );

        let levels = matching_levels(&host.list_levels(), &document.list_levels());
        enter(state, RunPhase::LevelsMatched);
        info!(count = levels.len(), "levels matched");
        diagnostics.set_matching_levels(levels.clone());

        let rooms = document.list_rooms();
        let index = ViewIndex::build(host.list_plan_views(&self.config.view_kinds));
        let filter = RoomFilter::new(&levels, self.config.match_mode);
        debug!(
            rooms = rooms.len(),
            views = index.len(),
            buckets = index.bucket_count(),
            "snapshot taken"
        );

        for room in &rooms {
            diagnostics.register_room(room);
            if !filter.on_matching_level(room) {
                diagnostics.no_matching_level(room.id);
            }
        }

        enter(state, RunPhase::PerViewProcessing);

        let planner = Planner::new(&rooms, filter, &link.transform);
        let plans = self.plan(&planner, &index);

        for (position, view) in index.views().iter().enumerate() {
            diagnostics.register_view(view, plans[index.bucket_of(position)].entries.len());
        }

        let mut candidates: HashSet<RoomId> = HashSet::new();
        for plan in &plans {
            candidates.extend(plan.entries.iter().map(PlanEntry::room_id));
        }
        for room in &rooms {
            if filter.on_matching_level(room) && !candidates.contains(&room.id) {
                diagnostics.no_candidate_view(room.id);
            }
        }

        if self.config.dry_run {
            apply::<H>(link, &index, &plans, diagnostics, None);
            return Ok(());
        }

        let committed = run_in_transaction(host, &self.config.transaction_label, |host| {
            apply(link, &index, &plans, diagnostics, Some(host));
            Ok::<(), TransactionError>(())
        });
        if let Err(error) = committed {
            diagnostics.roll_back();
            return Err(error.into());
        }

        Ok(())
    }

    fn plan(&self, planner: &Planner<'_>, index: &ViewIndex) -> Vec<BucketPlan> {
        let Some(threads) = self.config.worker_threads else {
            return planner.plan(index, None);
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("roomtag-plan-{i}"))
            .build()
        {
            Ok(pool) => planner.plan(index, Some(&pool)),
            Err(error) => {
                warn!(%error, threads, "planner pool unavailable, planning on the calling thread");
                planner.plan_sequential(index)
            }
        }
    }
}

/// Place (or, without a placer, plan) every candidate of every view
fn apply<P>(
    link: &Link,
    index: &ViewIndex,
    plans: &[BucketPlan],
    diagnostics: &mut Diagnostics,
    mut placer: Option<&mut P>,
) where
    P: TagPlacer + ?Sized,
{
    let mut visited: HashSet<(RoomId, ViewId)> = HashSet::new();

    for (position, view) in index.views().iter().enumerate() {
        let plan = &plans[index.bucket_of(position)];
        debug!(view = %view.id, name = %view.name, candidates = plan.entries.len(), "processing view");

        for entry in &plan.entries {
            let room_id = entry.room_id();
            if !visited.insert((room_id, view.id)) {
                diagnostics.duplicate(view.id);
                continue;
            }

            match *entry {
                PlanEntry::NoGeometry { error, .. } => {
                    debug!(room = %room_id, view = %view.id, %error, "room skipped");
                    diagnostics.no_usable_geometry(room_id, view.id, error);
                }
                PlanEntry::Place { point, .. } => {
                    let request = PlacementRequest {
                        room_id,
                        link_id: link.id,
                        view_id: view.id,
                        point,
                    };
                    match placer.as_deref_mut() {
                        None => diagnostics.planned(room_id, view.id, point),
                        Some(placer) => match placer.create_tag(link, &request) {
                            Ok(tag) => diagnostics.placed(room_id, view.id, point, tag),
                            Err(cause) => {
                                warn!(room = %room_id, view = %view.id, link = %link.id, %cause, "tag placement failed");
                                diagnostics.placement_failed(room_id, view.id, cause);
                            }
                        },
                    }
                }
            }
        }
    }
}

/// Advance `state`; an illegal move is a bug and is logged, not propagated
fn enter(state: &mut RunState, to: RunPhase) {
    if let Err(error) = state.advance(to) {
        tracing::error!(from = %state.phase(), %to, %error, "run phase not advanced");
    }
}
