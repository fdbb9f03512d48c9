//! Error types for roomtag
//!
//! Three classes:
//! - fatal conditions that abort a run before any tag is placed ([`AbortReason`])
//! - per-room placement failures reported by the host ([`PlacementError`]);
//!   recorded in the run report, never propagated
//! - setup errors from configuration and the run state machine

use crate::ids::{DocumentRef, ViewId};
use roomtag_geometry::Point2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Link selection failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum SelectionError {
    /// No link survived the name filter (or the host has no links)
    #[error("no linked model found{}", .filter.as_ref().map(|f| format!(" matching \"{f}\"")).unwrap_or_default())]
    NotFound {
        /// Filter that was applied, if any
        filter: Option<String>,
    },
}

/// Host refused to create a tag
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementError {
    /// The point cannot host a tag in this view
    #[error("invalid tag point {point}")]
    InvalidPoint {
        /// Offending point, host coordinates
        point: Point2,
    },

    /// The view does not accept room tags (template, wrong type, ...)
    #[error("view {view} cannot be tagged")]
    ViewNotTaggable {
        /// View that rejected the tag
        view: ViewId,
    },

    /// Any other host-side failure
    #[error("host error: {0}")]
    Host(String),
}

impl PlacementError {
    /// Create host error
    #[inline]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }
}

/// Host transaction could not be opened or committed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TransactionError {
    /// Transaction could not be started
    #[error("could not start transaction \"{label}\": {message}")]
    Begin {
        /// Transaction label
        label: String,
        /// Host message
        message: String,
    },

    /// Commit was rejected; all staged changes were rolled back
    #[error("commit rejected: {0}")]
    Commit(String),
}

/// Illegal run phase transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition is not in the allowed table
    #[error("illegal run phase transition")]
    IllegalTransition,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config could not be parsed
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but is not usable
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why a run stopped before placing tags
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbortReason {
    /// No candidate link
    #[error("{error}")]
    NoLink {
        /// Selection failure
        error: SelectionError,
    },

    /// Link was selected but its document is not loaded
    #[error("linked document {document} for link \"{link}\" is not available")]
    LinkedDocumentUnavailable {
        /// Link display name
        link: String,
        /// Target document handle
        document: DocumentRef,
    },

    /// Run configuration rejected
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Validation message
        message: String,
    },

    /// Host transaction failed; no tags were kept
    #[error("transaction failed: {error}")]
    Transaction {
        /// Transaction failure
        error: TransactionError,
    },
}

impl AbortReason {
    /// Check if this is the no-link condition
    #[inline]
    #[must_use]
    pub fn is_no_link(&self) -> bool {
        matches!(self, Self::NoLink { .. })
    }
}

impl From<SelectionError> for AbortReason {
    fn from(error: SelectionError) -> Self {
        Self::NoLink { error }
    }
}

impl From<TransactionError> for AbortReason {
    fn from(error: TransactionError) -> Self {
        Self::Transaction { error }
    }
}

impl From<ConfigError> for AbortReason {
    fn from(error: ConfigError) -> Self {
        Self::InvalidConfig {
            message: error.to_string(),
        }
    }
}
