//! Cluster node model

/// A member host of the failover cluster, as reported by the cluster service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    state: NodeState,
}

/// Node state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Up,
    Down,
    Paused,
    Joining,
    Unknown(u32),
}

impl Node {
    pub fn new(name: impl Into<String>, state: NodeState) -> Self {
        Node {
            name: name.into(),
            state,
        }
    }

    /// Returns the node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the state reported when the node was queried
    pub fn state(&self) -> NodeState {
        self.state
    }
}
