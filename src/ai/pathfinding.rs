//! A* pathfinding on a 2D grid
//!
//! 8-directional search with Euclidean edge costs and a Euclidean heuristic.
//! Frontier entries with equal f-cost pop in insertion order, so repeated
//! searches on an unchanged grid return the same path.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use glam::Vec2;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::grid::{Grid, PathNode};
use crate::core::{AiConfig, Diagnostic, DiagnosticHook, diagnostics};

type Coords = (i32, i32);

/// A* search options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Allow diagonal steps past blocked cardinal cells
    pub cut_corners: bool,
    /// Maximum number of nodes to expand before giving up (None = unbounded)
    pub max_iterations: Option<usize>,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            cut_corners: true,
            max_iterations: None,
        }
    }
}

impl PathfinderConfig {
    /// Set corner cutting
    #[must_use]
    pub fn with_cut_corners(mut self, cut_corners: bool) -> Self {
        self.cut_corners = cut_corners;
        self
    }

    /// Cap node expansions
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Reason a search produced no path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFailure {
    /// Start or goal lies outside the grid
    OutOfBounds,
    /// Goal cell is not walkable
    GoalBlocked,
    /// Frontier exhausted without reaching the goal
    NoPath,
    /// Expansion budget ran out
    MaxIterationsExceeded,
}

impl fmt::Display for PathFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "start or goal is outside the grid"),
            Self::GoalBlocked => write!(f, "goal cell is not walkable"),
            Self::NoPath => write!(f, "goal is unreachable"),
            Self::MaxIterationsExceeded => write!(f, "search exceeded its iteration budget"),
        }
    }
}

/// Result of pathfinding
#[derive(Debug, Clone, Default)]
pub struct PathResult {
    /// Waypoints in world coordinates, start and goal inclusive
    pub waypoints: Vec<Vec2>,
    /// Total path cost in world units
    pub cost: f32,
    /// Number of nodes expanded during search
    pub nodes_expanded: usize,
    /// Why the search failed, if it did
    pub failure: Option<PathFailure>,
}

impl PathResult {
    fn failed(reason: PathFailure, nodes_expanded: usize) -> Self {
        Self {
            waypoints: Vec::new(),
            cost: f32::INFINITY,
            nodes_expanded,
            failure: Some(reason),
        }
    }

    /// Check if no path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Frontier entry for the priority queue
#[derive(Debug, Clone, Copy)]
struct Node {
    coords: Coords,
    f_cost: f32, // g_cost + heuristic
    order: u64,  // push sequence, breaks f-cost ties
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; earlier pushes win ties
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a path using A* algorithm
#[must_use]
pub fn find_path(grid: &Grid, start: Vec2, goal: Vec2, config: &PathfinderConfig) -> PathResult {
    let (Some(start_node), Some(goal_node)) = (grid.get_node(start), grid.get_node(goal)) else {
        return PathResult::failed(PathFailure::OutOfBounds, 0);
    };

    if !goal_node.walkable {
        return PathResult::failed(PathFailure::GoalBlocked, 0);
    }

    let start_key = start_node.coords();
    let goal_key = goal_node.coords();
    let goal_pos = goal_node.position;
    log::trace!("A* from {start_key:?} to {goal_key:?}");

    let heuristic = |node: &PathNode| node.position.distance(goal_pos);

    let mut open_set = BinaryHeap::new();
    let mut closed_set: FxHashSet<Coords> = FxHashSet::default();
    let mut came_from: FxHashMap<Coords, Coords> = FxHashMap::default();
    let mut g_score: FxHashMap<Coords, f32> = FxHashMap::default();
    let mut order = 0_u64;
    let mut nodes_expanded = 0_usize;

    g_score.insert(start_key, 0.0);
    open_set.push(Node {
        coords: start_key,
        f_cost: heuristic(start_node),
        order,
    });

    while let Some(current) = open_set.pop() {
        // Stale entry for a node already finalized
        if closed_set.contains(&current.coords) {
            continue;
        }

        if current.coords == goal_key {
            let cost = g_score.get(&goal_key).copied().unwrap_or(0.0);
            let waypoints = reconstruct_path(grid, &came_from, goal_key);
            log::trace!(
                "A* found {} waypoints, cost {cost:.3}, {nodes_expanded} expanded",
                waypoints.len()
            );
            return PathResult {
                waypoints,
                cost,
                nodes_expanded,
                failure: None,
            };
        }

        if let Some(limit) = config.max_iterations
            && nodes_expanded >= limit
        {
            return PathResult::failed(PathFailure::MaxIterationsExceeded, nodes_expanded);
        }

        closed_set.insert(current.coords);
        nodes_expanded += 1;

        let (x, y) = current.coords;
        let Some(current_node) = grid.node(x, y) else {
            continue;
        };
        let current_g = g_score.get(&current.coords).copied().unwrap_or(f32::INFINITY);

        for neighbor in grid.neighbors(x, y, config.cut_corners) {
            let key = neighbor.coords();
            if !neighbor.walkable || closed_set.contains(&key) {
                continue;
            }

            let tentative_g = current_g + current_node.position.distance(neighbor.position);

            if tentative_g < g_score.get(&key).copied().unwrap_or(f32::INFINITY) {
                came_from.insert(key, current.coords);
                g_score.insert(key, tentative_g);

                order += 1;
                open_set.push(Node {
                    coords: key,
                    f_cost: tentative_g + heuristic(neighbor),
                    order,
                });
            }
        }
    }

    PathResult::failed(PathFailure::NoPath, nodes_expanded)
}

/// Walk predecessors back from the goal and convert to world positions
fn reconstruct_path(grid: &Grid, came_from: &FxHashMap<Coords, Coords>, goal: Coords) -> Vec<Vec2> {
    let mut path = vec![goal];
    let mut curr = goal;

    while let Some(&prev) = came_from.get(&curr) {
        path.push(prev);
        curr = prev;
    }

    path.reverse();

    path.iter()
        .map(|&(x, y)| grid.grid_to_world(x, y))
        .collect()
}

// ============================================================================
// Pathfinder
// ============================================================================

/// Owns a navigation grid and answers path requests against it.
pub struct Pathfinder {
    grid: Grid,
    config: PathfinderConfig,
    diagnostics: Option<DiagnosticHook>,
}

impl Pathfinder {
    /// Create a pathfinder over a fresh, fully walkable grid
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self::from_grid(Grid::new(width, height, cell_size))
    }

    /// Wrap an existing grid
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            config: PathfinderConfig::default(),
            diagnostics: None,
        }
    }

    /// Build grid and search options from configuration
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        Self::from_grid(Grid::from_config(&config.grid)).with_config(config.pathfinding.clone())
    }

    /// Replace search options
    #[must_use]
    pub fn with_config(mut self, config: PathfinderConfig) -> Self {
        self.config = config;
        self
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

    /// The navigation grid
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the navigation grid
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Search options
    #[must_use]
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Set a cell's walkability. Out-of-range coordinates are ignored.
    pub fn set_walkable(&mut self, x: i32, y: i32, walkable: bool) {
        if !self.grid.set_walkable(x, y, walkable) {
            log::debug!("Ignoring walkability change for ({x}, {y}) outside the grid");
            diagnostics::emit(
                self.diagnostics.as_ref(),
                Diagnostic::CellOutOfRange { x, y },
            );
        }
    }

    /// Look up the cell containing a world position
    #[must_use]
    pub fn get_node(&self, position: Vec2) -> Option<&PathNode> {
        self.grid.get_node(position)
    }

    /// Find a path, returning only the waypoints (empty if unreachable)
    #[must_use]
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Vec<Vec2> {
        self.find_path_detailed(start, end).waypoints
    }

    /// Find a path with cost and failure details
    #[must_use]
    pub fn find_path_detailed(&self, start: Vec2, end: Vec2) -> PathResult {
        let result = find_path(&self.grid, start, end, &self.config);

        if let Some(reason) = result.failure {
            log::debug!("No path from {start} to {end}: {reason}");
            diagnostics::emit(
                self.diagnostics.as_ref(),
                Diagnostic::PathNotFound { reason },
            );
        }

        result
    }
}

impl fmt::Debug for Pathfinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pathfinder")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}
