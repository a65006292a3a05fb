use storyloom_core::NodeId;
use thiserror::Error;

/// Rejections raised by graph mutations. The graph is left untouched whenever
/// one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Source node {0} does not exist")]
    InvalidSource(NodeId),
    #[error("Node {node_id}: {reason}")]
    TypeViolation { node_id: NodeId, reason: String },
    #[error("{field} cannot be empty")]
    EmptyInput { field: &'static str },
    #[error("Root node {0} is protected")]
    RootProtected(NodeId),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("Node {0} is already being edited")]
    EditInProgress(NodeId),
    #[error("No node is being edited")]
    NoActiveEdit,
    #[error("Duplicate id {0}")]
    DuplicateId(String),
}

impl GraphError {
    pub fn node_not_found(id: &NodeId) -> Self {
        Self::NotFound {
            kind: "Node",
            id: id.to_string(),
        }
    }
}
