//! roomtag core - linked-room tag reconciliation
//!
//! Takes the rooms of a linked (read-only) model and places one room tag per
//! room per matching plan view of the host model:
//! - picks a link and resolves its document
//! - pairs levels and phases across documents by name
//! - maps room points into host coordinates through the link transform
//! - skips rooms without usable geometry and survives per-tag host failures
//! - never tags the same room twice in one view within a run
//!
//! Host access goes through the traits in [`host`]; the outcome of a run is
//! a [`RunReport`].
//!
//! # Example
//!
//! ```rust,ignore
//! use roomtag_core::prelude::*;
//!
//! let config = ReconcileConfig::from_path("roomtag.toml")?;
//! let report = run_reconciliation(&mut host, &linked_documents, &config);
//!
//! println!("{report}");
//! for issue in report.issues.iter() {
//!     println!("  {issue}");
//! }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

// Core modules
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod host;
pub mod ids;
pub mod matching;
pub mod model;
pub mod run_state;
pub mod telemetry;

// Re-exports for convenience
pub use config::{MatchMode, ReconcileConfig, DEFAULT_TRANSACTION_LABEL};
pub use diagnostics::{
    Diagnostics, Issue, IssueKind, LinkSummary, Placement, RoomOutcome, RunReport, RunStatus,
    ViewOutcome,
};
pub use engine::{run_reconciliation, tag_point, ReconciliationEngine};
pub use error::{
    AbortReason, ConfigError, PlacementError, SelectionError, TransactionError, TransitionError,
};
pub use host::{
    run_in_transaction, HostDocument, LinkedDocument, LinkedSources, TagPlacer, Transactional,
};
pub use ids::{DocumentRef, LevelId, LinkId, RoomId, RunId, TagId, ViewId};
pub use model::{Level, Link, Phase, PlacementRequest, PlanView, Room, ViewKind};
pub use run_state::{RunPhase, RunState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the engine
    pub use crate::{
        run_reconciliation, AbortReason, DocumentRef, HostDocument, Level, Link, LinkedDocument,
        LinkedSources, MatchMode, PlacementError, PlacementRequest, PlanView, ReconcileConfig,
        ReconciliationEngine, Room, RoomId, RunReport, RunStatus, TagId, TagPlacer,
        TransactionError, Transactional, ViewId, ViewKind,
    };
    pub use roomtag_geometry::{AffineTransform, OrderedLoop, Point2, Point3};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
