//! Ready-made AI states
//!
//! Ready-made states for a typical guard agent. Each one receives its
//! triggers and actions as closures, so the state machine and the states
//! themselves stay free of game-world access.

use super::fsm::{State, StateHandle};

/// Trigger evaluated every update
pub type Predicate = Box<dyn FnMut() -> bool>;

/// Side effect supplied by game logic
pub type Callback = Box<dyn FnMut()>;

/// Identifiers for common agent behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiState {
    /// Standing still, waiting for something to happen
    Idle,
    /// Walking a waypoint route
    Patrol,
    /// Following a detected enemy
    Chase,
    /// Enemy is within reach
    Attack,
    /// Retreating from danger
    Flee,
    /// Checking out a disturbance
    Investigate,
}

/// Request a transition through an attached handle.
fn request(handle: Option<&StateHandle<AiState>>, target: AiState) {
    if let Some(handle) = handle {
        handle.transition_to(target);
    }
}

// ============================================================================
// Idle
// ============================================================================

/// Idle state - waiting for something to happen.
///
/// Moves to `Chase` as soon as an enemy is detected, or to `Patrol` once it
/// has idled for `max_idle_time` seconds and `should_patrol` agrees.
pub struct IdleState {
    should_patrol: Predicate,
    detect_enemy: Predicate,
    /// Time spent idle
    idle_time: f32,
    /// Idle time before patrolling is considered
    max_idle_time: f32,
    handle: Option<StateHandle<AiState>>,
}

impl IdleState {
    /// Default idle time in seconds
    pub const DEFAULT_MAX_IDLE_TIME: f32 = 3.0;

    /// Create an idle state with the default idle time
    #[must_use]
    pub fn new(
        should_patrol: impl FnMut() -> bool + 'static,
        detect_enemy: impl FnMut() -> bool + 'static,
    ) -> Self {
        Self {
            should_patrol: Box::new(should_patrol),
            detect_enemy: Box::new(detect_enemy),
            idle_time: 0.0,
            max_idle_time: Self::DEFAULT_MAX_IDLE_TIME,
            handle: None,
        }
    }

    /// Set the idle time before patrolling
    #[must_use]
    pub fn with_max_idle_time(mut self, max_idle_time: f32) -> Self {
        self.max_idle_time = max_idle_time;
        self
    }

    /// Seconds spent idle since the state was entered
    #[must_use]
    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }
}

impl State<AiState> for IdleState {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn attach(&mut self, handle: StateHandle<AiState>) {
        self.handle = Some(handle);
    }

    fn on_enter(&mut self) {
        self.idle_time = 0.0;
        log::info!("Entering Idle state");
    }

    fn on_update(&mut self, delta_time: f32) {
        self.idle_time += delta_time;

        if (self.detect_enemy)() {
            request(self.handle.as_ref(), AiState::Chase);
            return;
        }

        if self.idle_time >= self.max_idle_time && (self.should_patrol)() {
            request(self.handle.as_ref(), AiState::Patrol);
        }
    }

    fn on_exit(&mut self) {
        log::info!("Exiting Idle state");
    }
}

// ============================================================================
// Patrol
// ============================================================================

/// Patrol state - moving between waypoints.
pub struct PatrolState {
    detect_enemy: Predicate,
    reached_waypoint: Predicate,
    move_to_next_waypoint: Callback,
    handle: Option<StateHandle<AiState>>,
}

impl PatrolState {
    /// Create a patrol state
    #[must_use]
    pub fn new(
        detect_enemy: impl FnMut() -> bool + 'static,
        reached_waypoint: impl FnMut() -> bool + 'static,
        move_to_next_waypoint: impl FnMut() + 'static,
    ) -> Self {
        Self {
            detect_enemy: Box::new(detect_enemy),
            reached_waypoint: Box::new(reached_waypoint),
            move_to_next_waypoint: Box::new(move_to_next_waypoint),
            handle: None,
        }
    }
}

impl State<AiState> for PatrolState {
    fn name(&self) -> &'static str {
        "Patrol"
    }

    fn attach(&mut self, handle: StateHandle<AiState>) {
        self.handle = Some(handle);
    }

    fn on_enter(&mut self) {
        log::info!("Entering Patrol state");
        (self.move_to_next_waypoint)();
    }

    fn on_update(&mut self, _delta_time: f32) {
        if (self.detect_enemy)() {
            request(self.handle.as_ref(), AiState::Chase);
            return;
        }

        if (self.reached_waypoint)() {
            (self.move_to_next_waypoint)();
        }
    }

    fn on_exit(&mut self) {
        log::info!("Exiting Patrol state");
    }
}

// ============================================================================
// Chase
// ============================================================================

/// Chase state - pursuing a target.
pub struct ChaseState {
    is_enemy_in_range: Predicate,
    lost_enemy: Predicate,
    chase_enemy: Callback,
    handle: Option<StateHandle<AiState>>,
}

impl ChaseState {
    /// Create a chase state
    #[must_use]
    pub fn new(
        is_enemy_in_range: impl FnMut() -> bool + 'static,
        lost_enemy: impl FnMut() -> bool + 'static,
        chase_enemy: impl FnMut() + 'static,
    ) -> Self {
        Self {
            is_enemy_in_range: Box::new(is_enemy_in_range),
            lost_enemy: Box::new(lost_enemy),
            chase_enemy: Box::new(chase_enemy),
            handle: None,
        }
    }
}

impl State<AiState> for ChaseState {
    fn name(&self) -> &'static str {
        "Chase"
    }

    fn attach(&mut self, handle: StateHandle<AiState>) {
        self.handle = Some(handle);
    }

    fn on_enter(&mut self) {
        log::info!("Entering Chase state");
    }

    fn on_update(&mut self, _delta_time: f32) {
        if (self.is_enemy_in_range)() {
            request(self.handle.as_ref(), AiState::Attack);
            return;
        }

        if (self.lost_enemy)() {
            request(self.handle.as_ref(), AiState::Idle);
            return;
        }

        (self.chase_enemy)();
    }

    fn on_exit(&mut self) {
        log::info!("Exiting Chase state");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::StateMachine;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Shared world flags the injected closures read
    #[derive(Default)]
    struct World {
        enemy_visible: Rc<Cell<bool>>,
        enemy_in_range: Rc<Cell<bool>>,
        wants_patrol: Rc<Cell<bool>>,
        at_waypoint: Rc<Cell<bool>>,
        waypoint_moves: Rc<Cell<u32>>,
        chase_steps: Rc<Cell<u32>>,
    }

    fn flag(cell: &Rc<Cell<bool>>) -> impl FnMut() -> bool + 'static {
        let cell = Rc::clone(cell);
        move || cell.get()
    }

    fn counter(cell: &Rc<Cell<u32>>) -> impl FnMut() + 'static {
        let cell = Rc::clone(cell);
        move || cell.set(cell.get() + 1)
    }

    fn guard(world: &World) -> StateMachine<AiState> {
        let lost = Rc::clone(&world.enemy_visible);

        let mut fsm = StateMachine::new();
        fsm.add_state(
            AiState::Idle,
            IdleState::new(flag(&world.wants_patrol), flag(&world.enemy_visible))
                .with_max_idle_time(1.0),
        );
        fsm.add_state(
            AiState::Patrol,
            PatrolState::new(
                flag(&world.enemy_visible),
                flag(&world.at_waypoint),
                counter(&world.waypoint_moves),
            ),
        );
        fsm.add_state(
            AiState::Chase,
            ChaseState::new(
                flag(&world.enemy_in_range),
                move || !lost.get(),
                counter(&world.chase_steps),
            ),
        );
        fsm.set_initial_state(AiState::Idle).unwrap();
        fsm
    }

    #[test]
    fn test_idle_detects_enemy() {
        let world = World::default();
        let mut fsm = guard(&world);

        world.enemy_visible.set(true);
        fsm.update(0.1);

        assert_eq!(fsm.current_state(), Some(&AiState::Chase));
        assert_eq!(fsm.current_state_name(), Some("Chase"));
    }

    #[test]
    fn test_idle_patrols_after_timeout() {
        let world = World::default();
        let mut fsm = guard(&world);

        fsm.update(0.6);
        fsm.update(0.6);
        // Timed out but patrolling not wanted
        assert!(fsm.is_in_state(&AiState::Idle));

        world.wants_patrol.set(true);
        fsm.update(0.1);
        assert!(fsm.is_in_state(&AiState::Patrol));
        // Entering patrol heads for the first waypoint
        assert_eq!(world.waypoint_moves.get(), 1);
    }

    #[test]
    fn test_idle_timer_resets_on_enter() {
        let world = World::default();
        let mut fsm = guard(&world);

        fsm.update(0.9);
        world.enemy_visible.set(true);
        fsm.update(0.0);
        world.enemy_visible.set(false);
        fsm.update(0.0); // lost enemy -> Idle
        assert!(fsm.is_in_state(&AiState::Idle));

        world.wants_patrol.set(true);
        fsm.update(0.5);
        assert!(fsm.is_in_state(&AiState::Idle));
    }

    #[test]
    fn test_patrol_advances_waypoints() {
        let world = World::default();
        let mut fsm = guard(&world);
        fsm.transition_to(AiState::Patrol).unwrap();

        fsm.update(0.1);
        assert_eq!(world.waypoint_moves.get(), 1);

        world.at_waypoint.set(true);
        fsm.update(0.1);
        fsm.update(0.1);
        assert_eq!(world.waypoint_moves.get(), 3);

        world.enemy_visible.set(true);
        fsm.update(0.1);
        assert!(fsm.is_in_state(&AiState::Chase));
        assert_eq!(world.waypoint_moves.get(), 3);
    }

    #[test]
    fn test_chase_pursues_and_gives_up() {
        let world = World::default();
        let mut fsm = guard(&world);
        world.enemy_visible.set(true);
        fsm.update(0.1);

        fsm.update(0.1);
        fsm.update(0.1);
        assert_eq!(world.chase_steps.get(), 2);

        world.enemy_visible.set(false);
        fsm.update(0.1);
        assert!(fsm.is_in_state(&AiState::Idle));
        assert_eq!(world.chase_steps.get(), 2);
    }

    #[test]
    fn test_chase_in_range_without_attack_state() {
        let world = World::default();
        let mut fsm = guard(&world);
        world.enemy_visible.set(true);
        fsm.update(0.1);

        // Attack was never registered, so the request is dropped
        world.enemy_in_range.set(true);
        fsm.update(0.1);
        assert!(fsm.is_in_state(&AiState::Chase));
        assert_eq!(world.chase_steps.get(), 0);
    }

    #[test]
    fn test_chase_in_range_attacks() {
        struct AttackState;
        impl State<AiState> for AttackState {}

        let world = World::default();
        let mut fsm = guard(&world);
        fsm.add_state(AiState::Attack, AttackState);
        world.enemy_visible.set(true);
        fsm.update(0.1);

        world.enemy_in_range.set(true);
        fsm.update(0.1);
        assert!(fsm.is_in_state(&AiState::Attack));
        assert_eq!(fsm.current_state_name(), Some("AttackState"));
    }

    #[test]
    fn test_idle_time_accumulates() {
        let mut idle = IdleState::new(|| false, || false);
        assert_eq!(idle.idle_time(), 0.0);

        idle.on_enter();
        idle.on_update(0.25);
        idle.on_update(0.5);
        assert!((idle.idle_time() - 0.75).abs() < 1e-6);

        idle.on_exit();
        idle.on_enter();
        assert_eq!(idle.idle_time(), 0.0);
    }
}
