use crate::error::GraphError;
use crate::store::GraphStore;
use std::collections::HashSet;
use storyloom_core::NodeId;

/// What a cascading delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Removed nodes, descendants first and the requested node last.
    pub removed: Vec<NodeId>,
    /// Branches elsewhere in the graph that pointed into the removed set.
    pub stripped_branches: usize,
}

/// Removes a node and every node reachable through its outgoing branches.
///
/// Nodes are removed by id, so traversal order does not matter. The graph is
/// treated as a tree: a descendant shared with another parent is removed too,
/// and the other parent's branch into it is stripped by the final sweep. The
/// root is never removed, even if a branch leads back to it.
pub struct CascadeDeleter;

impl CascadeDeleter {
    pub fn delete(store: &mut GraphStore, id: &NodeId) -> Result<CascadeReport, GraphError> {
        if store.is_root(id) {
            return Err(GraphError::RootProtected(id.clone()));
        }
        if !store.contains(id) {
            return Err(GraphError::node_not_found(id));
        }

        let mut visited = HashSet::new();
        let mut removed = Vec::new();
        Self::remove_subtree(store, id, &mut visited, &mut removed);
        let stripped_branches = store.strip_dangling_branches();

        tracing::info!(
            "Deleted node {} with {} descendant(s); stripped {} dangling branch(es)",
            id,
            removed.len().saturating_sub(1),
            stripped_branches
        );
        Ok(CascadeReport {
            removed,
            stripped_branches,
        })
    }

    fn remove_subtree(
        store: &mut GraphStore,
        id: &NodeId,
        visited: &mut HashSet<NodeId>,
        removed: &mut Vec<NodeId>,
    ) {
        if !visited.insert(id.clone()) {
            return;
        }
        // Unresolved targets are simply skipped.
        let Some(node) = store.node(id) else {
            return;
        };
        let targets: Vec<NodeId> = node.branches.iter().map(|b| b.target_id.clone()).collect();

        for target in &targets {
            if store.is_root(target) {
                tracing::warn!("Branch from {} leads back to the root; root kept", id);
                continue;
            }
            Self::remove_subtree(store, target, visited, removed);
        }

        if let Some(node) = store.take_node(id) {
            removed.push(node.id);
        }
    }
}
