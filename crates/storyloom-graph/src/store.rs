use crate::cascade::{CascadeDeleter, CascadeReport};
use crate::config::EditorConfig;
use crate::error::GraphError;
use crate::geometry::Vec2;
use crate::layout::LayoutEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use storyloom_core::{Branch, BranchId, NodeId, NodeType, Position, StoryNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to create at the far end of a new branch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNodeSpec {
    pub node_type: Option<NodeType>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NewNodeSpec {
    pub fn of_type(node_type: NodeType) -> Self {
        Self {
            node_type: Some(node_type),
            ..Self::default()
        }
    }
}

/// Partial update of a node's text fields; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub node_id: NodeId,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub node_id: NodeId,
    /// Pointer position relative to the node's top-left corner at press time.
    pub grab_offset: Vec2,
}

fn require_text(value: &str, field: &'static str) -> Result<String, GraphError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GraphError::EmptyInput { field });
    }
    Ok(trimmed.to_string())
}

/// Owns every node of one story plus the editor's transient selection,
/// edit and drag state.
///
/// Nodes live in an arena indexed by `node_map`. A cascade empties slots
/// while it runs; `delete_node` compacts the arena afterwards, so a
/// `NodeIndex` is only valid until the next delete.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: Vec<Option<StoryNode>>,
    node_map: HashMap<NodeId, NodeIndex>,
    branch_owners: HashMap<BranchId, NodeId>,
    root: Option<NodeId>,
    selected: Option<NodeId>,
    edit: Option<EditSession>,
    drag: Option<DragSession>,
    config: EditorConfig,
    layout: LayoutEngine,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl GraphStore {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            nodes: Vec::new(),
            node_map: HashMap::new(),
            branch_owners: HashMap::new(),
            root: None,
            selected: None,
            edit: None,
            drag: None,
            config,
            layout: LayoutEngine::from_config(&config),
        }
    }

    /// Rebuild a store from nodes in display order, e.g. after loading a file.
    pub fn from_nodes(nodes: Vec<StoryNode>, config: EditorConfig) -> Result<Self, GraphError> {
        let mut store = Self::new(config);
        for node in nodes {
            store.insert_node(node)?;
        }
        Ok(store)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.layout = LayoutEngine::from_config(&config);
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    fn insert_node(&mut self, node: StoryNode) -> Result<NodeIndex, GraphError> {
        if self.node_map.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id.to_string()));
        }
        let mut seen = HashSet::with_capacity(node.branches.len());
        for branch in &node.branches {
            if self.branch_owners.contains_key(&branch.id) || !seen.insert(&branch.id) {
                return Err(GraphError::DuplicateId(branch.id.to_string()));
            }
        }

        for branch in &node.branches {
            self.branch_owners.insert(branch.id.clone(), node.id.clone());
        }
        if node.is_root && self.root.is_none() {
            self.root = Some(node.id.clone());
        }
        let idx = NodeIndex(self.nodes.len());
        self.node_map.insert(node.id.clone(), idx);
        self.nodes.push(Some(node));
        Ok(idx)
    }

    /// Synthesize the root node if the story has none yet. Returns its id.
    pub fn ensure_root(&mut self) -> NodeId {
        if let Some(root) = &self.root {
            return root.clone();
        }

        let mut root = StoryNode::with_defaults(NodeType::Regular, self.config.root_position);
        root.title = "Beginning".to_string();
        root.content = "Your story starts here...".to_string();
        root.is_root = true;
        let root_id = root.id.clone();

        // Fresh ids cannot collide.
        let _ = self.insert_node(root);
        self.selected = Some(root_id.clone());
        tracing::debug!("Synthesized root node {}", root_id);
        root_id
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node_map.contains_key(id)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&StoryNode> {
        self.index_of(id).and_then(|idx| self.nodes[idx.0].as_ref())
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut StoryNode> {
        let idx = self.index_of(id)?;
        self.nodes[idx.0].as_mut()
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &StoryNode> {
        self.nodes.iter().flatten()
    }

    pub fn root_id(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub fn root(&self) -> Option<&StoryNode> {
        self.root.as_ref().and_then(|id| self.node(id))
    }

    pub fn is_root(&self, id: &NodeId) -> bool {
        self.root.as_ref() == Some(id)
    }

    pub fn branch_count(&self) -> usize {
        self.branch_owners.len()
    }

    /// The owning node and the branch itself.
    pub fn branch(&self, id: &BranchId) -> Option<(&StoryNode, &Branch)> {
        let owner = self.node(self.branch_owners.get(id)?)?;
        let branch = owner.branches.iter().find(|b| &b.id == id)?;
        Some((owner, branch))
    }

    pub fn selected(&self) -> Option<&StoryNode> {
        self.selected.as_ref().and_then(|id| self.node(id))
    }

    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: &NodeId) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::node_not_found(id));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.nodes().map(|n| n.position)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a branch from `source_id` to a brand-new node.
    pub fn add_branch(
        &mut self,
        source_id: &NodeId,
        branch_text: &str,
        spec: NewNodeSpec,
    ) -> Result<(Branch, StoryNode), GraphError> {
        let source = self
            .node(source_id)
            .ok_or_else(|| GraphError::InvalidSource(source_id.clone()))?;
        if !source.can_add_branch() {
            let reason = match source.node_type.max_branches().unwrap_or(0) {
                0 => format!("{} nodes cannot have branches", source.node_type),
                max => format!(
                    "{} nodes allow at most {} branch(es)",
                    source.node_type, max
                ),
            };
            return Err(GraphError::TypeViolation {
                node_id: source_id.clone(),
                reason,
            });
        }
        let text = require_text(branch_text, "Branch text")?;

        let placement = self.layout.place_child(source.position, self.positions());
        let node_type = spec.node_type.unwrap_or_default();
        let mut node = StoryNode::with_defaults(node_type, placement.position);
        if let Some(title) = spec.title.filter(|t| !t.trim().is_empty()) {
            node.title = title.trim().to_string();
        }
        if let Some(content) = spec.content.filter(|c| !c.trim().is_empty()) {
            node.content = content.trim().to_string();
        }

        let branch = Branch {
            id: BranchId::generate(),
            text,
            target_id: node.id.clone(),
        };

        self.insert_node(node.clone())?;
        self.branch_owners
            .insert(branch.id.clone(), source_id.clone());
        if let Some(source) = self.node_mut(source_id) {
            source.branches.push(branch.clone());
            source.touch();
        }

        tracing::debug!(
            "Added branch {} from {} to new {} node {} at ({}, {})",
            branch.id,
            source_id,
            node_type,
            node.id,
            node.position.x,
            node.position.y
        );
        Ok((branch, node))
    }

    /// Delete a node together with everything reachable through its branches.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<CascadeReport, GraphError> {
        let report = CascadeDeleter::delete(self, id)?;
        self.compact();

        let first = self.nodes().next().map(|n| n.id.clone());
        self.selected = first;
        if self
            .edit
            .as_ref()
            .is_some_and(|s| !self.contains(&s.node_id))
        {
            self.edit = None;
        }
        if self
            .drag
            .as_ref()
            .is_some_and(|d| !self.contains(&d.node_id))
        {
            self.drag = None;
        }
        Ok(report)
    }

    fn apply_update(&mut self, id: &NodeId, update: NodeUpdate) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::node_not_found(id));
        }
        let title = update
            .title
            .as_deref()
            .map(|t| require_text(t, "Title"))
            .transpose()?;
        let content = update
            .content
            .as_deref()
            .map(|c| require_text(c, "Content"))
            .transpose()?;

        if let Some(node) = self.node_mut(id) {
            if let Some(title) = title {
                node.title = title;
            }
            if let Some(content) = content {
                node.content = content;
            }
            node.touch();
        }
        Ok(())
    }

    pub fn update_node(
        &mut self,
        id: &NodeId,
        update: NodeUpdate,
    ) -> Result<&StoryNode, GraphError> {
        self.apply_update(id, update)?;
        self.node(id).ok_or_else(|| GraphError::node_not_found(id))
    }

    /// Change a node's type, keeping its existing branches within the new limit.
    pub fn set_node_type(&mut self, id: &NodeId, node_type: NodeType) -> Result<(), GraphError> {
        let node = self.node(id).ok_or_else(|| GraphError::node_not_found(id))?;
        if node.is_root && node_type == NodeType::End {
            return Err(GraphError::RootProtected(id.clone()));
        }
        if !node_type.accepts_branch_count(node.branches.len()) {
            return Err(GraphError::TypeViolation {
                node_id: id.clone(),
                reason: format!(
                    "cannot become {} while it has {} branch(es)",
                    node_type,
                    node.branches.len()
                ),
            });
        }
        if let Some(node) = self.node_mut(id) {
            node.node_type = node_type;
            node.touch();
        }
        Ok(())
    }

    pub fn set_node_media(&mut self, id: &NodeId, media: Option<String>) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        node.media = media.filter(|m| !m.trim().is_empty());
        node.touch();
        Ok(())
    }

    pub fn update_branch_text(&mut self, id: &BranchId, text: &str) -> Result<(), GraphError> {
        let owner = self
            .branch_owners
            .get(id)
            .cloned()
            .ok_or_else(|| GraphError::NotFound {
                kind: "Branch",
                id: id.to_string(),
            })?;
        let text = require_text(text, "Branch text")?;
        if let Some(node) = self.node_mut(&owner)
            && let Some(branch) = node.branches.iter_mut().find(|b| &b.id == id)
        {
            branch.text = text;
            node.touch();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edit session
    // ------------------------------------------------------------------

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Open the single edit session. Fails while another session is open.
    pub fn open_edit(&mut self, id: &NodeId) -> Result<&EditSession, GraphError> {
        if let Some(active) = &self.edit {
            return Err(GraphError::EditInProgress(active.node_id.clone()));
        }
        if !self.contains(id) {
            return Err(GraphError::node_not_found(id));
        }
        let session = self.edit.insert(EditSession {
            node_id: id.clone(),
            opened_at: Utc::now(),
        });
        Ok(&*session)
    }

    /// Apply `update` to the node being edited and release the session.
    /// A rejected update keeps the session open.
    pub fn commit_edit(&mut self, update: NodeUpdate) -> Result<&StoryNode, GraphError> {
        let node_id = self
            .edit
            .as_ref()
            .map(|s| s.node_id.clone())
            .ok_or(GraphError::NoActiveEdit)?;
        self.apply_update(&node_id, update)?;
        self.edit = None;
        self.node(&node_id)
            .ok_or_else(|| GraphError::node_not_found(&node_id))
    }

    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.edit.take()
    }

    // ------------------------------------------------------------------
    // Drag session
    // ------------------------------------------------------------------

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Press: start dragging `id`, remembering where on the node it was grabbed.
    pub fn begin_drag(&mut self, id: &NodeId, pointer: Position) -> Result<(), GraphError> {
        let node = self.node(id).ok_or_else(|| GraphError::node_not_found(id))?;
        let grab_offset = Vec2::from(pointer) - Vec2::from(node.position);
        self.drag = Some(DragSession {
            node_id: id.clone(),
            grab_offset,
        });
        Ok(())
    }

    /// Move: reposition the dragged node under the pointer. No-op without a drag.
    pub fn drag_to(&mut self, pointer: Position) -> Option<Position> {
        let session = self.drag.clone()?;
        let position = Position::from(Vec2::from(pointer) - session.grab_offset).clamped();
        let node = self.node_mut(&session.node_id)?;
        node.position = position;
        node.touch();
        Some(position)
    }

    /// Release: end the drag, returning the node that was moved.
    pub fn end_drag(&mut self) -> Option<NodeId> {
        self.drag.take().map(|d| d.node_id)
    }

    // ------------------------------------------------------------------
    // Cascade support
    // ------------------------------------------------------------------

    /// Remove a single node by id, leaving branches that point at it in place.
    pub(crate) fn take_node(&mut self, id: &NodeId) -> Option<StoryNode> {
        let idx = self.node_map.remove(id)?;
        let node = self.nodes[idx.0].take()?;
        for branch in &node.branches {
            self.branch_owners.remove(&branch.id);
        }
        if self.root.as_ref() == Some(id) {
            self.root = None;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(node)
    }

    /// Close the slots left empty by removals. Indices handed out earlier are
    /// invalidated.
    fn compact(&mut self) {
        if self.nodes.len() == self.node_map.len() {
            return;
        }
        self.nodes.retain(Option::is_some);
        for (i, node) in self.nodes.iter().flatten().enumerate() {
            self.node_map.insert(node.id.clone(), NodeIndex(i));
        }
    }

    /// Drop every branch whose target no longer resolves. Returns how many went.
    pub(crate) fn strip_dangling_branches(&mut self) -> usize {
        let mut stripped = Vec::new();
        let node_map = &self.node_map;
        for node in self.nodes.iter_mut().flatten() {
            let before = node.branches.len();
            node.branches.retain(|b| {
                let keep = node_map.contains_key(&b.target_id);
                if !keep {
                    stripped.push(b.id.clone());
                }
                keep
            });
            if node.branches.len() != before {
                node.touch();
            }
        }
        for id in &stripped {
            self.branch_owners.remove(id);
        }
        stripped.len()
    }
}

/// Serialized form: nodes in display order plus the UI selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphSnapshot {
    nodes: Vec<StoryNode>,
    #[serde(default)]
    selected: Option<NodeId>,
}

impl Serialize for GraphStore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphSnapshot {
            nodes: self.nodes().cloned().collect(),
            selected: self.selected.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GraphStore {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = GraphSnapshot::deserialize(deserializer)?;
        let mut store = GraphStore::from_nodes(snapshot.nodes, EditorConfig::default())
            .map_err(serde::de::Error::custom)?;
        let selected = snapshot
            .selected
            .filter(|id| store.contains(id))
            .or_else(|| store.nodes().next().map(|n| n.id.clone()));
        store.selected = selected;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_root() -> (GraphStore, NodeId) {
        let mut store = GraphStore::default();
        let root = store.ensure_root();
        (store, root)
    }

    #[test]
    fn test_ensure_root_is_idempotent() {
        let (mut store, root) = store_with_root();
        assert_eq!(store.ensure_root(), root);
        assert_eq!(store.len(), 1);
        assert!(store.root().is_some_and(|n| n.is_root));
        assert_eq!(store.selected_id(), Some(&root));
    }

    #[test]
    fn test_add_branch_creates_positioned_target() {
        let (mut store, root) = store_with_root();

        let (branch, node) = store
            .add_branch(&root, "  go north ", NewNodeSpec::default())
            .unwrap();

        assert_eq!(branch.text, "go north");
        assert_eq!(branch.target_id, node.id);
        assert_eq!(node.node_type, NodeType::Regular);
        assert_eq!(node.title, NodeType::Regular.default_title());
        assert_eq!(node.position, Position::new(300.0, 100.0));
        assert_eq!(store.root().unwrap().branches, vec![branch]);
        assert_eq!(store.branch_count(), 1);
    }

    #[test]
    fn test_add_branch_uses_supplied_text() {
        let (mut store, root) = store_with_root();
        let spec = NewNodeSpec {
            node_type: Some(NodeType::Branch),
            title: Some("Crossroads".to_string()),
            content: Some("   ".to_string()),
        };

        let (_, node) = store.add_branch(&root, "walk", spec).unwrap();

        assert_eq!(node.title, "Crossroads");
        assert_eq!(node.content, NodeType::Branch.default_content());
    }

    #[test]
    fn test_add_branch_rejections() {
        let (mut store, root) = store_with_root();

        let missing = NodeId::from("missing");
        assert_eq!(
            store.add_branch(&missing, "x", NewNodeSpec::default()),
            Err(GraphError::InvalidSource(missing))
        );
        assert_eq!(
            store.add_branch(&root, "   ", NewNodeSpec::default()),
            Err(GraphError::EmptyInput {
                field: "Branch text"
            })
        );

        let (_, end) = store
            .add_branch(&root, "finish", NewNodeSpec::of_type(NodeType::End))
            .unwrap();
        assert!(matches!(
            store.add_branch(&end.id, "more", NewNodeSpec::default()),
            Err(GraphError::TypeViolation { .. })
        ));
        assert!(matches!(
            store.add_branch(&root, "second", NewNodeSpec::default()),
            Err(GraphError::TypeViolation { .. })
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_branch_nodes_accept_many_branches() {
        let (mut store, root) = store_with_root();
        store.set_node_type(&root, NodeType::Branch).unwrap();

        for label in ["left", "right", "back"] {
            store.add_branch(&root, label, NewNodeSpec::default()).unwrap();
        }

        let texts: Vec<_> = store
            .root()
            .unwrap()
            .branches
            .iter()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(texts, ["left", "right", "back"]);
    }

    #[test]
    fn test_update_node_validates_fields() {
        let (mut store, root) = store_with_root();

        let node = store
            .update_node(
                &root,
                NodeUpdate {
                    title: Some(" Dawn ".to_string()),
                    content: None,
                },
            )
            .unwrap();
        assert_eq!(node.title, "Dawn");

        let err = store
            .update_node(
                &root,
                NodeUpdate {
                    title: Some("ok".to_string()),
                    content: Some("\n".to_string()),
                },
            )
            .unwrap_err();
        assert_eq!(err, GraphError::EmptyInput { field: "Content" });
        assert_eq!(store.root().unwrap().title, "Dawn");

        assert!(matches!(
            store.update_node(&NodeId::from("nope"), NodeUpdate::default()),
            Err(GraphError::NotFound { .. })
        ));
    }

    #[test]
    fn test_single_edit_session() {
        let (mut store, root) = store_with_root();
        let (_, child) = store.add_branch(&root, "on", NewNodeSpec::default()).unwrap();

        store.open_edit(&root).unwrap();
        assert_eq!(
            store.open_edit(&child.id).unwrap_err(),
            GraphError::EditInProgress(root.clone())
        );

        // A rejected commit keeps the session.
        assert!(
            store
                .commit_edit(NodeUpdate {
                    title: Some(String::new()),
                    content: None,
                })
                .is_err()
        );
        assert!(store.edit_session().is_some());

        store
            .commit_edit(NodeUpdate {
                title: Some("Opening".to_string()),
                content: None,
            })
            .unwrap();
        assert!(store.edit_session().is_none());

        store.open_edit(&child.id).unwrap();
        assert!(store.cancel_edit().is_some());
        assert_eq!(store.commit_edit(NodeUpdate::default()).unwrap_err(), GraphError::NoActiveEdit);
    }

    #[test]
    fn test_deleting_edited_node_releases_session() {
        let (mut store, root) = store_with_root();
        let (_, child) = store.add_branch(&root, "on", NewNodeSpec::default()).unwrap();

        store.open_edit(&child.id).unwrap();
        store.delete_node(&child.id).unwrap();

        assert!(store.edit_session().is_none());
        assert_eq!(store.selected_id(), Some(&root));
    }

    #[test]
    fn test_set_node_type_limits() {
        let (mut store, root) = store_with_root();
        store.add_branch(&root, "on", NewNodeSpec::default()).unwrap();

        assert_eq!(
            store.set_node_type(&root, NodeType::End),
            Err(GraphError::RootProtected(root.clone()))
        );
        store.set_node_type(&root, NodeType::Branch).unwrap();
        store.add_branch(&root, "two", NewNodeSpec::default()).unwrap();
        assert!(matches!(
            store.set_node_type(&root, NodeType::Regular),
            Err(GraphError::TypeViolation { .. })
        ));
    }

    #[test]
    fn test_update_branch_text() {
        let (mut store, root) = store_with_root();
        let (branch, _) = store.add_branch(&root, "on", NewNodeSpec::default()).unwrap();

        store.update_branch_text(&branch.id, "onwards").unwrap();
        assert_eq!(store.branch(&branch.id).unwrap().1.text, "onwards");
        assert!(store.update_branch_text(&branch.id, " ").is_err());
        assert!(matches!(
            store.update_branch_text(&BranchId::from("nope"), "x"),
            Err(GraphError::NotFound { kind: "Branch", .. })
        ));
    }

    #[test]
    fn test_drag_sequence_keeps_grab_offset() {
        let (mut store, root) = store_with_root();

        assert_eq!(store.drag_to(Position::new(5.0, 5.0)), None);

        store.begin_drag(&root, Position::new(120.0, 110.0)).unwrap();
        let moved = store.drag_to(Position::new(220.0, 310.0)).unwrap();
        assert_eq!(moved, Position::new(200.0, 300.0));

        let clamped = store.drag_to(Position::new(0.0, 0.0)).unwrap();
        assert_eq!(clamped, Position::new(0.0, 0.0));

        assert_eq!(store.end_drag(), Some(root.clone()));
        assert!(store.drag_session().is_none());
        assert_eq!(store.root().unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_snapshot_round_trip_rebuilds_indices() {
        let (mut store, root) = store_with_root();
        let (branch, child) = store.add_branch(&root, "on", NewNodeSpec::default()).unwrap();
        store.select(&child.id).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let restored: GraphStore = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.root_id(), Some(&root));
        assert_eq!(restored.selected_id(), Some(&child.id));
        assert_eq!(restored.branch(&branch.id).unwrap().0.id, root);
    }

    #[test]
    fn test_duplicate_ids_rejected_on_load() {
        let node = StoryNode::with_defaults(NodeType::Regular, Position::default());
        let result = GraphStore::from_nodes(vec![node.clone(), node], EditorConfig::default());
        assert!(matches!(result, Err(GraphError::DuplicateId(_))));

        let mut root = StoryNode::with_defaults(NodeType::Branch, Position::default());
        root.is_root = true;
        for text in ["left", "right"] {
            root.branches.push(Branch {
                id: BranchId::from("dup"),
                text: text.to_string(),
                target_id: root.id.clone(),
            });
        }
        let result = GraphStore::from_nodes(vec![root], EditorConfig::default());
        assert_eq!(result.err(), Some(GraphError::DuplicateId("dup".to_string())));
    }

    #[test]
    fn test_delete_compacts_arena_and_reselects() {
        let (mut store, root) = store_with_root();
        store.set_node_type(&root, NodeType::Branch).unwrap();
        let (_, a) = store.add_branch(&root, "a", NewNodeSpec::default()).unwrap();
        let (_, b) = store.add_branch(&a.id, "b", NewNodeSpec::default()).unwrap();
        let (_, c) = store.add_branch(&root, "c", NewNodeSpec::default()).unwrap();
        store.select(&b.id).unwrap();

        store.delete_node(&a.id).unwrap();

        assert_eq!(store.nodes.len(), 2);
        assert_eq!(store.index_of(&root), Some(NodeIndex(0)));
        assert_eq!(store.index_of(&c.id), Some(NodeIndex(1)));
        assert_eq!(store.node(&c.id).map(|n| n.title.as_str()), Some("New Scene"));
        assert_eq!(store.selected_id(), Some(&root));

        for i in 0..10 {
            let (_, n) = store
                .add_branch(&root, &format!("n{i}"), NewNodeSpec::default())
                .unwrap();
            store.delete_node(&n.id).unwrap();
        }
        assert_eq!(store.nodes.len(), store.len());
    }
}
