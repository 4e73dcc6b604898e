//! Status returned by behavior nodes.

/// The result of ticking a behavior node.
///
/// `Running` is an ordinary return value, not a suspension point: the game
/// loop is expected to tick the tree again on a later frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// The node completed successfully.
    Success,
    /// The node failed.
    Failure,
    /// The node has not finished yet.
    Running,
}

impl NodeStatus {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, NodeStatus::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, NodeStatus::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, NodeStatus::Running)
    }

    /// Swaps Success and Failure; Running is unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            NodeStatus::Success => NodeStatus::Failure,
            NodeStatus::Failure => NodeStatus::Success,
            NodeStatus::Running => NodeStatus::Running,
        }
    }
}

impl From<bool> for NodeStatus {
    fn from(value: bool) -> Self {
        if value {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(NodeStatus::Success.is_success());
        assert!(!NodeStatus::Success.is_failure());
        assert!(NodeStatus::Failure.is_failure());
        assert!(!NodeStatus::Failure.is_running());
        assert!(NodeStatus::Running.is_running());
        assert!(!NodeStatus::Running.is_success());
    }

    #[test]
    fn test_invert_keeps_running() {
        assert_eq!(NodeStatus::Success.invert(), NodeStatus::Failure);
        assert_eq!(NodeStatus::Failure.invert(), NodeStatus::Success);
        assert_eq!(NodeStatus::Running.invert(), NodeStatus::Running);
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(NodeStatus::from(true), NodeStatus::Success);
        assert_eq!(NodeStatus::from(false), NodeStatus::Failure);
    }
}
