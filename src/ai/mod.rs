//! AI and navigation module
//!
//! Provides grid pathfinding, behavior trees, and finite state machines.

mod behavior;
mod fsm;
mod grid;
mod pathfinding;
mod states;

pub use behavior::{ActionFn, BehaviorNode, BehaviorTree, ConditionFn, NodeStatus};
pub use fsm::{State, StateHandle, StateId, StateMachine, StateMachineError};
pub use grid::{Grid, PathNode};
pub use pathfinding::{PathFailure, PathResult, Pathfinder, PathfinderConfig, find_path};
pub use states::{AiState, Callback, ChaseState, IdleState, PatrolState, Predicate};
