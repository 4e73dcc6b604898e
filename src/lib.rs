//! Decision and navigation core for game agents
//!
//! This crate provides:
//! - Grid-based A* pathfinding
//! - Behavior trees with Sequence, Selector, Parallel, Inverter and Repeater nodes
//! - A generic finite state machine with enter/update/exit hooks
//!
//! Everything runs synchronously on the caller's thread. The game loop ticks
//! trees and updates state machines once per frame.

pub mod ai;
pub mod core;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        AiState, BehaviorNode, BehaviorTree, ChaseState, Grid, IdleState, NodeStatus,
        PathFailure, PathResult, Pathfinder, PathfinderConfig, PatrolState, State, StateHandle,
        StateMachine,
    };
    pub use crate::core::{AiConfig, ConfigError, Diagnostic, DiagnosticHook};
    pub use glam::Vec2;
}
