//! Finite State Machine for AI Behavior
//!
//! A generic state machine keyed by an arbitrary state id. States encapsulate
//! behavior with enter/update/exit lifecycle hooks and trigger their own
//! transitions through a [`StateHandle`] they receive when registered.
//!
//! # Design Principles
//!
//! - **No domain logic**: the machine only stores states and sequences hooks
//! - **Strict ordering**: `on_exit` of the old state always runs before
//!   `on_enter` of the new one
//! - **Fail quiet**: unknown ids leave the machine unchanged; the returned
//!   `Result` and the diagnostics hook make the miss observable
//! - **No ownership cycle**: handles hold a weak reference to the machine's
//!   transition queue, never the machine itself
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Mode { Idle, Alert }
//!
//! struct Idle { handle: Option<StateHandle<Mode>>, noise: Rc<Cell<bool>> }
//!
//! impl State<Mode> for Idle {
//!     fn attach(&mut self, handle: StateHandle<Mode>) { self.handle = Some(handle); }
//!
//!     fn on_update(&mut self, _dt: f32) {
//!         if self.noise.get() {
//!             if let Some(h) = &self.handle { h.transition_to(Mode::Alert); }
//!         }
//!     }
//! }
//!
//! let mut fsm = StateMachine::new();
//! fsm.add_state(Mode::Idle, Idle { handle: None, noise });
//! fsm.add_state(Mode::Alert, Alert::default());
//! fsm.set_initial_state(Mode::Idle)?;
//! fsm.update(dt); // may move to Mode::Alert
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::core::{Diagnostic, DiagnosticHook, diagnostics};

/// Upper bound on transitions applied back-to-back from lifecycle hooks.
const MAX_CHAINED_TRANSITIONS: usize = 16;

/// Requirements for a state identifier.
pub trait StateId: Eq + Hash + Clone + fmt::Debug + 'static {}

impl<T: Eq + Hash + Clone + fmt::Debug + 'static> StateId for T {}

type RequestQueue<Id> = RefCell<VecDeque<Id>>;

// ============================================================================
// State Trait
// ============================================================================

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `attach()` - Called once when the state is registered
/// 2. `on_enter()` - Called each time the state becomes active
/// 3. `on_update()` - Called each frame while active
/// 4. `on_exit()` - Called when another state takes over
pub trait State<Id: StateId> {
    /// State name for debugging and logging.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Receive the back-reference used to request transitions.
    fn attach(&mut self, _handle: StateHandle<Id>) {}

    /// Called when entering this state.
    fn on_enter(&mut self) {}

    /// Called each frame while in this state.
    fn on_update(&mut self, _delta_time: f32) {}

    /// Called when exiting this state.
    fn on_exit(&mut self) {}
}

// ============================================================================
// State Handle
// ============================================================================

/// Non-owning link from a state back to its machine.
///
/// Requests are queued and applied by the machine as soon as the lifecycle
/// hook that made them returns. Requests made outside a hook are applied on
/// the next `update` or `transition_to`.
pub struct StateHandle<Id> {
    id: Id,
    requests: Weak<RequestQueue<Id>>,
}

impl<Id: StateId> StateHandle<Id> {
    /// Id this state was registered under
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Request a transition to `target`.
    ///
    /// Returns `false` if the machine no longer exists.
    pub fn transition_to(&self, target: Id) -> bool {
        match self.requests.upgrade() {
            Some(queue) => {
                queue.borrow_mut().push_back(target);
                true
            }
            None => false,
        }
    }

    /// Check whether the owning machine is still alive
    pub fn is_attached(&self) -> bool {
        self.requests.strong_count() > 0
    }
}

impl<Id: Clone> Clone for StateHandle<Id> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            requests: Weak::clone(&self.requests),
        }
    }
}

impl<Id: fmt::Debug> fmt::Debug for StateHandle<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("id", &self.id)
            .field("attached", &(self.requests.strong_count() > 0))
            .finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by state machine operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError<Id> {
    /// The id was never registered with `add_state`
    UnknownState(Id),
}

impl<Id: fmt::Debug> fmt::Display for StateMachineError<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownState(id) => write!(f, "unknown state {id:?}"),
        }
    }
}

impl<Id: fmt::Debug> std::error::Error for StateMachineError<Id> {}

// ============================================================================
// State Machine
// ============================================================================

/// A finite state machine over registered states.
///
/// # Type Parameters
///
/// - `Id`: State identifier (enum, integer, string...)
pub struct StateMachine<Id: StateId> {
    /// Registered states
    states: FxHashMap<Id, Box<dyn State<Id>>>,
    /// Active state id
    current: Option<Id>,
    /// Transitions requested through handles
    requests: Rc<RequestQueue<Id>>,
    diagnostics: Option<DiagnosticHook>,
}

impl<Id: StateId> StateMachine<Id> {
    /// Create an empty state machine with no active state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: FxHashMap::default(),
            current: None,
            requests: Rc::new(RefCell::new(VecDeque::new())),
            diagnostics: None,
        }
    }

    /// Attach a diagnostics observer
    #[must_use]
    pub fn with_diagnostics(mut self, hook: DiagnosticHook) -> Self {
        self.diagnostics = Some(hook);
        self
    }

    /// Attach or replace the diagnostics observer
    pub fn set_diagnostics(&mut self, hook: DiagnosticHook) {
        self.diagnostics = Some(hook);
    }

    /// Register a state under `id`, replacing any earlier state with that id.
    pub fn add_state<S: State<Id> + 'static>(&mut self, id: Id, mut state: S) {
        state.attach(StateHandle {
            id: id.clone(),
            requests: Rc::downgrade(&self.requests),
        });

        log::debug!("Registered state {id:?} ({})", state.name());
        if self.states.insert(id, Box::new(state)).is_some() {
            log::debug!("Replaced an existing state");
        }
    }

    /// Activate `id` and run its `on_enter`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownState` if `id` is not registered; the machine is left
    /// unchanged.
    pub fn set_initial_state(&mut self, id: Id) -> Result<(), StateMachineError<Id>> {
        if !self.states.contains_key(&id) {
            return Err(self.unknown(id));
        }

        log::debug!("Initial state {id:?}");
        if let Some(state) = self.states.get_mut(&id) {
            state.on_enter();
        }
        self.current = Some(id);
        self.apply_requests();
        Ok(())
    }

    /// Exit the active state (if any) and enter `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownState` if `id` is not registered; the active state is
    /// left unchanged and no hooks run.
    pub fn transition_to(&mut self, id: Id) -> Result<(), StateMachineError<Id>> {
        self.switch_to(id)?;
        self.apply_requests();
        Ok(())
    }

    /// Update the active state. Does nothing until an initial state is set.
    pub fn update(&mut self, delta_time: f32) {
        let Some(id) = &self.current else {
            return;
        };

        if let Some(state) = self.states.get_mut(id) {
            state.on_update(delta_time);
        }
        self.apply_requests();
    }

    /// Id of the active state
    #[must_use]
    pub fn current_state(&self) -> Option<&Id> {
        self.current.as_ref()
    }

    /// Name of the active state
    #[must_use]
    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current
            .as_ref()
            .and_then(|id| self.states.get(id))
            .map(|state| state.name())
    }

    /// Check if the machine is in the given state
    #[must_use]
    pub fn is_in_state(&self, id: &Id) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Check whether `id` has been registered
    #[must_use]
    pub fn contains_state(&self, id: &Id) -> bool {
        self.states.contains_key(id)
    }

    /// Number of registered states
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    fn switch_to(&mut self, id: Id) -> Result<(), StateMachineError<Id>> {
        if !self.states.contains_key(&id) {
            return Err(self.unknown(id));
        }

        if let Some(previous) = self.current.take() {
            if let Some(state) = self.states.get_mut(&previous) {
                state.on_exit();
            }
            log::debug!("Transition {previous:?} -> {id:?}");
        }

        if let Some(state) = self.states.get_mut(&id) {
            state.on_enter();
        }
        self.current = Some(id);
        Ok(())
    }

    /// Apply transitions queued by state handles, in request order.
    fn apply_requests(&mut self) {
        let mut applied = 0;

        loop {
            let next = self.requests.borrow_mut().pop_front();
            let Some(id) = next else {
                break;
            };

            if applied == MAX_CHAINED_TRANSITIONS {
                self.requests.borrow_mut().clear();
                log::warn!("Dropped transition requests after {applied} chained transitions");
                diagnostics::emit(
                    self.diagnostics.as_ref(),
                    Diagnostic::TransitionLimit { limit: applied },
                );
                break;
            }

            // Unknown ids are reported by switch_to and otherwise ignored
            if self.switch_to(id).is_ok() {
                applied += 1;
            }
        }
    }

    fn unknown(&self, id: Id) -> StateMachineError<Id> {
        log::debug!("Ignoring unknown state {id:?}");
        diagnostics::emit(
            self.diagnostics.as_ref(),
            Diagnostic::UnknownState {
                id: format!("{id:?}"),
            },
        );
        StateMachineError::UnknownState(id)
    }
}

impl<Id: StateId> Default for StateMachine<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: StateId> fmt::Debug for StateMachine<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &self.states.len())
            .field("pending", &self.requests.borrow().len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
