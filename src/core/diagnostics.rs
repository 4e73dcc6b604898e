//! Diagnostics for fail-quiet AI operations
//!
//! The AI layer never panics or returns hard errors from its per-frame entry
//! points. Lookups that miss, unreachable goals and malformed trees degrade to
//! a safe default instead. A [`DiagnosticHook`] lets the host observe those
//! cases without changing what the call returns.
//!
//! # Example
//!
//! ```ignore
//! let mut pathfinder = Pathfinder::new(16, 16, 1.0);
//! pathfinder.set_diagnostics(Box::new(|d: &Diagnostic| log::warn!("ai: {d}")));
//! ```

use std::fmt;

use crate::ai::PathFailure;

// ============================================================================
// Diagnostic Types
// ============================================================================

/// Something the AI layer silently recovered from.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Diagnostic {
    /// A decorator node was ticked without a child and returned `Failure`.
    MissingChild {
        /// Node kind, e.g. `"Inverter"`
        node: &'static str,
    },

    /// A state id was not registered with the state machine.
    UnknownState {
        /// Debug rendering of the requested id
        id: String,
    },

    /// State lifecycle hooks kept requesting transitions and the machine
    /// stopped following them.
    TransitionLimit {
        /// Number of chained transitions that were applied
        limit: usize,
    },

    /// A grid write addressed a cell outside the grid and was ignored.
    CellOutOfRange {
        /// Column
        x: i32,
        /// Row
        y: i32,
    },

    /// A path request produced no path.
    PathNotFound {
        /// Why the search gave up
        reason: PathFailure,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChild { node } => write!(f, "{node} ticked without a child"),
            Self::UnknownState { id } => write!(f, "unknown state {id}"),
            Self::TransitionLimit { limit } => {
                write!(f, "stopped after {limit} chained transitions")
            }
            Self::CellOutOfRange { x, y } => write!(f, "cell ({x}, {y}) is outside the grid"),
            Self::PathNotFound { reason } => write!(f, "no path: {reason}"),
        }
    }
}

/// Observer invoked for every [`Diagnostic`].
pub type DiagnosticHook = Box<dyn Fn(&Diagnostic) + Send + Sync>;

/// Forward a diagnostic to an optional hook.
#[inline]
pub(crate) fn emit(hook: Option<&DiagnosticHook>, diagnostic: Diagnostic) {
    if let Some(hook) = hook {
        hook(&diagnostic);
    }
}
