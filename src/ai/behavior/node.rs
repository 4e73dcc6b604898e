//! Behavior tree nodes.
//!
//! Every node kind is a variant of [`BehaviorNode`] and a single recursive
//! evaluator dispatches on it. Children are moved into their parent, so a
//! tree can never share a node or contain a cycle.
//!
//! | Kind        | Children | Result                                                    |
//! |-------------|----------|-----------------------------------------------------------|
//! | `Sequence`  | many     | first non-Success child status, else Success (AND)        |
//! | `Selector`  | many     | first non-Failure child status, else Failure (OR)         |
//! | `Parallel`  | many     | ticks all; thresholds decide Success / Failure / Running  |
//! | `Inverter`  | one      | swaps Success and Failure                                 |
//! | `Repeater`  | one      | child must succeed `max_repeats` times within one tick    |
//! | `Action`    | none     | callback status                                           |
//! | `Condition` | none     | predicate as Success / Failure                            |

use std::fmt;

use super::NodeStatus;
use crate::core::{Diagnostic, DiagnosticHook, diagnostics};

/// Leaf callback producing a status
pub type ActionFn = Box<dyn FnMut() -> NodeStatus>;

/// Leaf predicate
pub type ConditionFn = Box<dyn FnMut() -> bool>;

/// A node in a behavior tree.
pub enum BehaviorNode {
    /// Ticks children in order until one does not succeed.
    Sequence(Vec<BehaviorNode>),

    /// Ticks children in order until one does not fail.
    Selector(Vec<BehaviorNode>),

    /// Ticks every child, then compares tallies against the thresholds.
    ///
    /// There is no short-circuit: children keep running (and repeating their
    /// side effects) even once the aggregate result is decided. Thresholds
    /// larger than the child count are a construction error and are not
    /// checked.
    Parallel {
        /// Successes needed to succeed
        success_threshold: usize,
        /// Failures needed to fail (checked after successes)
        failure_threshold: usize,
        /// Child nodes, ticked in order
        children: Vec<BehaviorNode>,
    },

    /// Swaps Success and Failure of its child. Fails without a child.
    Inverter(Option<Box<BehaviorNode>>),

    /// Re-ticks its child within a single tick until it has succeeded
    /// `max_repeats` times.
    ///
    /// Any other child status is returned immediately and `count` is kept,
    /// so the next tick resumes where this one stopped. Fails without a child.
    Repeater {
        /// Successes required to complete
        max_repeats: u32,
        /// Successes so far
        count: u32,
        /// Wrapped node
        child: Option<Box<BehaviorNode>>,
    },

    /// Runs a callback.
    Action(ActionFn),

    /// Evaluates a predicate. Never returns Running.
    Condition(ConditionFn),
}

impl BehaviorNode {
    /// Construct a [`BehaviorNode::Sequence`].
    #[must_use]
    pub fn sequence(children: Vec<BehaviorNode>) -> Self {
        BehaviorNode::Sequence(children)
    }

    /// Construct a [`BehaviorNode::Selector`].
    #[must_use]
    pub fn selector(children: Vec<BehaviorNode>) -> Self {
        BehaviorNode::Selector(children)
    }

    /// Construct a [`BehaviorNode::Parallel`].
    #[must_use]
    pub fn parallel(
        success_threshold: usize,
        failure_threshold: usize,
        children: Vec<BehaviorNode>,
    ) -> Self {
        BehaviorNode::Parallel {
            success_threshold,
            failure_threshold,
            children,
        }
    }

    /// Construct an [`BehaviorNode::Inverter`] around `child`.
    #[must_use]
    pub fn inverter(child: BehaviorNode) -> Self {
        BehaviorNode::Inverter(Some(Box::new(child)))
    }

    /// Construct a [`BehaviorNode::Repeater`] around `child`.
    #[must_use]
    pub fn repeater(max_repeats: u32, child: BehaviorNode) -> Self {
        BehaviorNode::Repeater {
            max_repeats,
            count: 0,
            child: Some(Box::new(child)),
        }
    }

    /// Construct an [`BehaviorNode::Action`] leaf.
    #[must_use]
    pub fn action(action: impl FnMut() -> NodeStatus + 'static) -> Self {
        BehaviorNode::Action(Box::new(action))
    }

    /// Construct a [`BehaviorNode::Condition`] leaf.
    #[must_use]
    pub fn condition(condition: impl FnMut() -> bool + 'static) -> Self {
        BehaviorNode::Condition(Box::new(condition))
    }

    /// Node kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BehaviorNode::Sequence(_) => "Sequence",
            BehaviorNode::Selector(_) => "Selector",
            BehaviorNode::Parallel { .. } => "Parallel",
            BehaviorNode::Inverter(_) => "Inverter",
            BehaviorNode::Repeater { .. } => "Repeater",
            BehaviorNode::Action(_) => "Action",
            BehaviorNode::Condition(_) => "Condition",
        }
    }

    /// Append a child to a composite.
    ///
    /// Returns `false` (and drops `child`) if this node is not a composite.
    pub fn push_child(&mut self, child: BehaviorNode) -> bool {
        match self {
            BehaviorNode::Sequence(children)
            | BehaviorNode::Selector(children)
            | BehaviorNode::Parallel { children, .. } => {
                children.push(child);
                true
            }
            _ => false,
        }
    }

    /// Set (or replace) the child of a decorator.
    ///
    /// Returns `false` (and drops `child`) if this node is not a decorator.
    pub fn set_child(&mut self, child: BehaviorNode) -> bool {
        match self {
            BehaviorNode::Inverter(slot) | BehaviorNode::Repeater { child: slot, .. } => {
                *slot = Some(Box::new(child));
                true
            }
            _ => false,
        }
    }

    /// Clear all repeat counters in this subtree.
    pub fn reset(&mut self) {
        match self {
            BehaviorNode::Sequence(children)
            | BehaviorNode::Selector(children)
            | BehaviorNode::Parallel { children, .. } => {
                children.iter_mut().for_each(BehaviorNode::reset);
            }
            BehaviorNode::Inverter(child) => {
                if let Some(child) = child {
                    child.reset();
                }
            }
            BehaviorNode::Repeater { count, child, .. } => {
                *count = 0;
                if let Some(child) = child {
                    child.reset();
                }
            }
            BehaviorNode::Action(_) | BehaviorNode::Condition(_) => {}
        }
    }

    /// Tick this node once and return its status.
    pub fn tick(&mut self) -> NodeStatus {
        self.evaluate(None)
    }

    pub(crate) fn evaluate(&mut self, hook: Option<&DiagnosticHook>) -> NodeStatus {
        match self {
            BehaviorNode::Sequence(children) => {
                for child in children {
                    match child.evaluate(hook) {
                        NodeStatus::Success => continue,
                        other => return other, // Short-circuit
                    }
                }
                NodeStatus::Success
            }

            BehaviorNode::Selector(children) => {
                for child in children {
                    match child.evaluate(hook) {
                        NodeStatus::Failure => continue,
                        other => return other, // Short-circuit
                    }
                }
                NodeStatus::Failure
            }

            BehaviorNode::Parallel {
                success_threshold,
                failure_threshold,
                children,
            } => {
                let mut success_count = 0;
                let mut failure_count = 0;

                for child in children.iter_mut() {
                    match child.evaluate(hook) {
                        NodeStatus::Success => success_count += 1,
                        NodeStatus::Failure => failure_count += 1,
                        NodeStatus::Running => {}
                    }
                }

                if success_count >= *success_threshold {
                    NodeStatus::Success
                } else if failure_count >= *failure_threshold {
                    NodeStatus::Failure
                } else {
                    NodeStatus::Running
                }
            }

            BehaviorNode::Inverter(child) => match child {
                Some(child) => child.evaluate(hook).invert(),
                None => missing_child("Inverter", hook),
            },

            BehaviorNode::Repeater {
                max_repeats,
                count,
                child,
            } => {
                let Some(child) = child else {
                    return missing_child("Repeater", hook);
                };

                while *count < *max_repeats {
                    let status = child.evaluate(hook);
                    if status != NodeStatus::Success {
                        return status;
                    }
                    *count += 1;
                }

                *count = 0;
                NodeStatus::Success
            }

            BehaviorNode::Action(action) => action(),

            BehaviorNode::Condition(condition) => NodeStatus::from(condition()),
        }
    }
}

fn missing_child(node: &'static str, hook: Option<&DiagnosticHook>) -> NodeStatus {
    log::trace!("{node} has no child");
    diagnostics::emit(hook, Diagnostic::MissingChild { node });
    NodeStatus::Failure
}

impl fmt::Debug for BehaviorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorNode::Sequence(children) | BehaviorNode::Selector(children) => {
                f.debug_tuple(self.kind()).field(children).finish()
            }
            BehaviorNode::Parallel {
                success_threshold,
                failure_threshold,
                children,
            } => f
                .debug_struct("Parallel")
                .field("success_threshold", success_threshold)
                .field("failure_threshold", failure_threshold)
                .field("children", children)
                .finish(),
            BehaviorNode::Inverter(child) => f.debug_tuple("Inverter").field(child).finish(),
            BehaviorNode::Repeater {
                max_repeats,
                count,
                child,
            } => f
                .debug_struct("Repeater")
                .field("max_repeats", max_repeats)
                .field("count", count)
                .field("child", child)
                .finish(),
            BehaviorNode::Action(_) | BehaviorNode::Condition(_) => f.write_str(self.kind()),
        }
    }
}
