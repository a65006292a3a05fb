use crate::config::EditorConfig;
use crate::error::GraphError;
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use storyloom_core::{Character, CharacterId, StoryMeta};

/// One story being authored: metadata, the node graph and its cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub meta: StoryMeta,
    pub graph: GraphStore,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Story {
    /// A new story whose graph already holds its root node.
    pub fn new(meta: StoryMeta, config: EditorConfig) -> Self {
        let mut graph = GraphStore::new(config);
        graph.ensure_root();
        Self {
            meta,
            graph,
            characters: Vec::new(),
        }
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| &c.id == id)
    }

    pub fn add_character(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> Result<&Character, GraphError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::EmptyInput {
                field: "Character name",
            });
        }
        self.characters.push(Character {
            id: CharacterId::generate(),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        });
        Ok(&self.characters[self.characters.len() - 1])
    }

    pub fn update_character(
        &mut self,
        id: &CharacterId,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), GraphError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::EmptyInput {
                field: "Character name",
            });
        }
        let character = self
            .characters
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| GraphError::NotFound {
                kind: "Character",
                id: id.to_string(),
            })?;
        character.name = name.to_string();
        character.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok(())
    }

    pub fn remove_character(&mut self, id: &CharacterId) -> Result<Character, GraphError> {
        let pos = self
            .characters
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| GraphError::NotFound {
                kind: "Character",
                id: id.to_string(),
            })?;
        Ok(self.characters.remove(pos))
    }
}
