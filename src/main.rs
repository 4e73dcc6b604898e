//! Headless demo: a guard patrols a walled yard, spots an intruder, chases it
//! along A* paths and attacks once adjacent.
//!
//! Run with `RUST_LOG=info` to follow the state changes. An optional RON file
//! path replaces the built-in yard layout.

use std::cell::RefCell;
use std::rc::Rc;

use agent_ai::prelude::*;

const FRAMES: u32 = 240;
const DELTA_TIME: f32 = 0.1;
const SIGHT_RANGE: f32 = 5.0;
const ATTACK_RANGE: f32 = 1.5;
const INTRUDER_FRAME: u32 = 60;
const SWINGS_BEFORE_ESCAPE: u32 = 9;

/// Agent data shared by the state closures
struct Guard {
    position: Vec2,
    route: Vec<Vec2>,
    waypoints: Vec<Vec2>,
    next_waypoint: usize,
    intruder: Option<Vec2>,
    swings: u32,
}

impl Guard {
    fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            position: waypoints.first().copied().unwrap_or(Vec2::ZERO),
            route: Vec::new(),
            waypoints,
            next_waypoint: 0,
            intruder: None,
            swings: 0,
        }
    }

    /// Advance one cell along the current route
    fn step(&mut self) {
        if !self.route.is_empty() {
            self.position = self.route.remove(0);
        }
    }

    /// Replace the route with a fresh path to `target`, minus the current cell
    fn plan(&mut self, pathfinder: &Pathfinder, target: Vec2) {
        self.route = pathfinder
            .find_path(self.position, target)
            .into_iter()
            .skip(1)
            .collect();
    }

    fn distance_to_intruder(&self) -> Option<f32> {
        self.intruder.map(|p| p.distance(self.position))
    }
}

/// Attack state - swings at the intruder while it stays in reach
struct AttackState {
    tree: BehaviorTree,
    handle: Option<StateHandle<AiState>>,
}

impl State<AiState> for AttackState {
    fn name(&self) -> &'static str {
        "Attack"
    }

    fn attach(&mut self, handle: StateHandle<AiState>) {
        self.handle = Some(handle);
    }

    fn on_enter(&mut self) {
        log::info!("Entering Attack state");
        self.tree.reset();
    }

    fn on_update(&mut self, _delta_time: f32) {
        if self.tree.tick() == NodeStatus::Failure
            && let Some(handle) = &self.handle
        {
            handle.transition_to(AiState::Chase);
        }
    }
}

fn default_config() -> AiConfig {
    let mut config = AiConfig::default();
    config.grid.width = 12;
    config.grid.height = 8;
    config.grid.blocked = (0..=5).map(|y| (6, y)).collect();
    config
}

fn build_machine(guard: &Rc<RefCell<Guard>>, pathfinder: &Rc<Pathfinder>) -> StateMachine<AiState> {
    let sees = {
        let guard = Rc::clone(guard);
        move || {
            guard
                .borrow()
                .distance_to_intruder()
                .is_some_and(|d| d <= SIGHT_RANGE)
        }
    };
    let in_reach = {
        let guard = Rc::clone(guard);
        move || {
            guard
                .borrow()
                .distance_to_intruder()
                .is_some_and(|d| d <= ATTACK_RANGE)
        }
    };

    let reached_waypoint = {
        let guard = Rc::clone(guard);
        move || guard.borrow().route.is_empty()
    };
    let next_waypoint = {
        let guard = Rc::clone(guard);
        let pathfinder = Rc::clone(pathfinder);
        move || {
            let mut g = guard.borrow_mut();
            if g.waypoints.is_empty() {
                return;
            }
            let target = g.waypoints[g.next_waypoint];
            g.next_waypoint = (g.next_waypoint + 1) % g.waypoints.len();
            g.plan(&pathfinder, target);
        }
    };
    let chase = {
        let guard = Rc::clone(guard);
        let pathfinder = Rc::clone(pathfinder);
        move || {
            let mut g = guard.borrow_mut();
            if let Some(target) = g.intruder {
                g.plan(&pathfinder, target);
            }
        }
    };
    let lost = {
        let sees = sees.clone();
        move || !sees()
    };

    let swing = {
        let guard = Rc::clone(guard);
        move || {
            let mut g = guard.borrow_mut();
            g.swings += 1;
            log::info!("Swing {}", g.swings);
            NodeStatus::Success
        }
    };
    let attack_tree = BehaviorTree::new(BehaviorNode::sequence(vec![
        BehaviorNode::condition(in_reach.clone()),
        BehaviorNode::repeater(3, BehaviorNode::action(swing)),
    ]))
    .with_diagnostics(Box::new(|d: &Diagnostic| log::warn!("Attack tree: {d}")));

    let mut fsm = StateMachine::new()
        .with_diagnostics(Box::new(|d: &Diagnostic| log::warn!("FSM: {d}")));
    fsm.add_state(AiState::Idle, IdleState::new(|| true, sees.clone()));
    fsm.add_state(
        AiState::Patrol,
        PatrolState::new(sees, reached_waypoint, next_waypoint),
    );
    fsm.add_state(AiState::Chase, ChaseState::new(in_reach, lost, chase));
    fsm.add_state(
        AiState::Attack,
        AttackState {
            tree: attack_tree,
            handle: None,
        },
    );
    fsm
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => AiConfig::load_ron(path)?,
        None => default_config(),
    };
    log::info!(
        "Yard {}x{} with {} blocked cells",
        config.grid.width,
        config.grid.height,
        config.grid.blocked.len()
    );

    let pathfinder = Rc::new(
        Pathfinder::from_config(&config)
            .with_diagnostics(Box::new(|d: &Diagnostic| log::warn!("Path: {d}"))),
    );
    let guard = Rc::new(RefCell::new(Guard::new(vec![
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 6.0),
        Vec2::new(4.0, 6.0),
        Vec2::new(4.0, 1.0),
    ])));

    let mut fsm = build_machine(&guard, &pathfinder);
    fsm.set_initial_state(AiState::Idle)?;

    for frame in 0..FRAMES {
        if frame == INTRUDER_FRAME {
            guard.borrow_mut().intruder = Some(Vec2::new(8.0, 3.0));
            log::info!("Intruder appears at frame {frame}");
        }

        fsm.update(DELTA_TIME);
        guard.borrow_mut().step();

        let mut g = guard.borrow_mut();
        if g.swings >= SWINGS_BEFORE_ESCAPE && g.intruder.take().is_some() {
            log::info!("Intruder escaped at frame {frame}");
        }
    }

    let g = guard.borrow();
    log::info!(
        "Finished in {:?} at {} after {} swings",
        fsm.current_state(),
        g.position,
        g.swings
    );
    Ok(())
}
