use serde::{Deserialize, Serialize};
use storyloom_core::{BranchId, CharacterId, NodeId, NodeType};

/// Flat story shape sent to the persistence backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistencePayload {
    pub title: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub nodes: Vec<PayloadNode>,
    /// Every branch of every node, with the owning node made explicit.
    pub branches: Vec<PayloadBranch>,
    pub characters: Vec<PayloadCharacter>,
}

impl PersistencePayload {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadNode {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f32,
    pub y: f32,
    pub is_root: bool,
    pub media: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadBranch {
    pub id: BranchId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    /// The choice text shown to the reader.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadCharacter {
    pub id: CharacterId,
    pub name: String,
    pub description: Option<String>,
}

/// Acknowledgement of a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedStory {
    pub story_id: String,
}
