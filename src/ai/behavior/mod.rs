//! Behavior trees for agent decision making
//!
//! A [`BehaviorTree`] owns a root [`BehaviorNode`] and evaluates it once per
//! [`BehaviorTree::tick`]. Ticks are synchronous: `Running` only tells the
//! game loop to tick again on a later frame. The only state carried between
//! ticks lives in `Repeater` counters.
//!
//! # Example
//!
//! ```ignore
//! let mut tree = BehaviorTree::new(BehaviorNode::selector(vec![
//!     BehaviorNode::sequence(vec![
//!         BehaviorNode::condition(move || sees_enemy.get()),
//!         BehaviorNode::action(move || attack()),
//!     ]),
//!     BehaviorNode::action(|| NodeStatus::Running), // wander
//! ]));
//!
//! let status = tree.tick();
//! ```

mod node;
mod status;

use std::fmt;

pub use node::{ActionFn, BehaviorNode, ConditionFn};
pub use status::NodeStatus;

use crate::core::DiagnosticHook;

/// A behavior tree with a single root node.
pub struct BehaviorTree {
    root: BehaviorNode,
    diagnostics: Option<DiagnosticHook>,
}

impl BehaviorTree {
    /// Create a tree from its root node.
    #[must_use]
    pub fn new(root: BehaviorNode) -> Self {
        Self {
            root,
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

    /// Evaluate the tree once.
    pub fn tick(&mut self) -> NodeStatus {
        let status = self.root.evaluate(self.diagnostics.as_ref());
        log::trace!("{} tick -> {:?}", self.root.kind(), status);
        status
    }

    /// Clear all repeat counters.
    pub fn reset(&mut self) {
        self.root.reset();
    }

    /// The root node
    pub fn root(&self) -> &BehaviorNode {
        &self.root
    }

    /// Mutable access to the root node
    pub fn root_mut(&mut self) -> &mut BehaviorNode {
        &mut self.root
    }
}

impl fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("root", &self.root)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Diagnostic;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_tick_evaluates_root() {
        let calls = Rc::new(Cell::new(0));
        let inner = Rc::clone(&calls);
        let mut tree = BehaviorTree::new(BehaviorNode::sequence(vec![
            BehaviorNode::condition(|| true),
            BehaviorNode::condition(|| false),
            BehaviorNode::action(move || {
                inner.set(inner.get() + 1);
                NodeStatus::Success
            }),
        ]));

        assert_eq!(tree.tick(), NodeStatus::Failure);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_guarded_fallback() {
        let sees_enemy = Rc::new(Cell::new(false));
        let attacks = Rc::new(Cell::new(0));

        let guard = Rc::clone(&sees_enemy);
        let counter = Rc::clone(&attacks);
        let mut tree = BehaviorTree::new(BehaviorNode::selector(vec![
            BehaviorNode::sequence(vec![
                BehaviorNode::condition(move || guard.get()),
                BehaviorNode::action(move || {
                    counter.set(counter.get() + 1);
                    NodeStatus::Success
                }),
            ]),
            BehaviorNode::action(|| NodeStatus::Running),
        ]));

        assert_eq!(tree.tick(), NodeStatus::Running);
        assert_eq!(attacks.get(), 0);

        sees_enemy.set(true);
        assert_eq!(tree.tick(), NodeStatus::Success);
        assert_eq!(attacks.get(), 1);
    }

    #[test]
    fn test_missing_child_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut tree = BehaviorTree::new(BehaviorNode::selector(vec![
            BehaviorNode::Inverter(None),
            BehaviorNode::Repeater {
                max_repeats: 1,
                count: 0,
                child: None,
            },
        ]))
        .with_diagnostics(Box::new(move |d: &Diagnostic| {
            sink.lock().unwrap().push(d.clone());
        }));

        assert_eq!(tree.tick(), NodeStatus::Failure);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Diagnostic::MissingChild { node: "Inverter" },
                Diagnostic::MissingChild { node: "Repeater" },
            ]
        );
    }

    #[test]
    fn test_root_mut_and_reset() {
        let mut tree = BehaviorTree::new(BehaviorNode::Inverter(None));
        assert_eq!(tree.tick(), NodeStatus::Failure);

        assert!(tree.root_mut().set_child(BehaviorNode::repeater(
            2,
            BehaviorNode::action(|| NodeStatus::Running)
        )));
        assert_eq!(tree.tick(), NodeStatus::Running);

        tree.reset();
        assert_eq!(tree.root().kind(), "Inverter");
    }
}
