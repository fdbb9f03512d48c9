//! Run phase state machine
//!
//! ```text
//! Init -> LinkSelected -> LevelsMatched -> PerViewProcessing -> Done
//!   |          |                                 |
//!   +----------+---------------------------------+--> Aborted
//! ```
//!
//! `Aborted` from `PerViewProcessing` covers a host transaction that could
//! not be opened or committed.

use crate::error::TransitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Nothing done yet
    Init,
    /// A link was chosen
    LinkSelected,
    /// Matching levels are known
    LevelsMatched,
    /// Planning and placing per view
    PerViewProcessing,
    /// Finished, possibly with per-room skips and failures
    Done,
    /// Stopped by a fatal condition
    Aborted,
}

impl RunPhase {
    /// Check if no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::LinkSelected => "link_selected",
            Self::LevelsMatched => "levels_matched",
            Self::PerViewProcessing => "per_view_processing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Validates a phase transition.
///
/// Returns an error for anything outside [`allowed_transitions`]; with the
/// `strict-debug` feature an illegal transition panics instead.
///
/// # Errors
/// `TransitionError::IllegalTransition` if `from -> to` is not allowed.
pub fn validate_transition(from: RunPhase, to: RunPhase) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("Illegal run phase transition attempted: {from:?} -> {to:?}");

        Err(TransitionError::IllegalTransition)
    }
}

/// Phases reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: RunPhase) -> Vec<RunPhase> {
    use RunPhase::{Aborted, Done, Init, LevelsMatched, LinkSelected, PerViewProcessing};
    match from {
        Init => vec![LinkSelected, Aborted],
        LinkSelected => vec![LevelsMatched, Aborted],
        LevelsMatched => vec![PerViewProcessing],
        PerViewProcessing => vec![Done, Aborted],
        Done | Aborted => vec![],
    }
}

fn allowed(from: RunPhase, to: RunPhase) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}

/// Current phase of one run, advanced only through legal transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    phase: RunPhase,
    history: Vec<RunPhase>,
}

impl RunState {
    /// Create state in [`RunPhase::Init`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Init,
            history: vec![RunPhase::Init],
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Every phase entered, in order, starting with `Init`
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    /// Move to `to`
    ///
    /// # Errors
    /// `TransitionError::IllegalTransition` if the move is not allowed; the
    /// state is left unchanged.
    pub fn advance(&mut self, to: RunPhase) -> Result<(), TransitionError> {
        validate_transition(self.phase, to)?;
        tracing::trace!(from = %self.phase, to = %to, "run phase");
        self.phase = to;
        self.history.push(to);
        Ok(())
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [RunPhase; 6] = [
        RunPhase::Init,
        RunPhase::LinkSelected,
        RunPhase::LevelsMatched,
        RunPhase::PerViewProcessing,
        RunPhase::Done,
        RunPhase::Aborted,
    ];

    #[test]
    fn happy_path() {
        let mut state = RunState::new();
        for next in [
            RunPhase::LinkSelected,
            RunPhase::LevelsMatched,
            RunPhase::PerViewProcessing,
            RunPhase::Done,
        ] {
            state.advance(next).unwrap();
        }
        assert_eq!(state.phase(), RunPhase::Done);
        assert_eq!(state.history().len(), 5);
    }

    #[test]
    fn abort_only_from_allowed_phases() {
        assert!(validate_transition(RunPhase::Init, RunPhase::Aborted).is_ok());
        assert!(validate_transition(RunPhase::LinkSelected, RunPhase::Aborted).is_ok());
        assert!(validate_transition(RunPhase::PerViewProcessing, RunPhase::Aborted).is_ok());
    }

    #[cfg(not(feature = "strict-debug"))]
    #[test]
    fn rejects_skipping_and_leaving_terminal() {
        assert_eq!(
            validate_transition(RunPhase::Init, RunPhase::PerViewProcessing),
            Err(TransitionError::IllegalTransition)
        );
        assert!(validate_transition(RunPhase::LevelsMatched, RunPhase::Aborted).is_err());
        assert!(validate_transition(RunPhase::Done, RunPhase::Init).is_err());
        assert!(validate_transition(RunPhase::Aborted, RunPhase::Done).is_err());

        let mut state = RunState::new();
        assert!(state.advance(RunPhase::Done).is_err());
        assert_eq!(state.phase(), RunPhase::Init);
    }

    #[test]
    fn terminal_phases_have_no_exits() {
        for phase in ALL {
            assert_eq!(phase.is_terminal(), allowed_transitions(phase).is_empty());
        }
    }

    #[cfg(not(feature = "strict-debug"))]
    proptest! {
        #[test]
        fn validate_agrees_with_table(from in 0usize..6, to in 0usize..6) {
            let (from, to) = (ALL[from], ALL[to]);
            let listed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(validate_transition(from, to).is_ok(), listed);
        }

        #[test]
        fn random_walks_stay_legal(steps in proptest::collection::vec(0usize..6, 0..12)) {
            let mut state = RunState::new();
            for step in steps {
                let before = state.phase();
                let target = ALL[step];
                match state.advance(target) {
                    Ok(()) => prop_assert!(allowed_transitions(before).contains(&target)),
                    Err(_) => prop_assert_eq!(state.phase(), before),
                }
            }
            prop_assert_eq!(state.history()[0], RunPhase::Init);
        }
    }
}
