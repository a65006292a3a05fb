use crate::story::Story;
use storyloom_core::{BranchId, CharacterId, NodeId};
use thiserror::Error;

pub const MAX_STORY_TITLE_LEN: usize = 50;
pub const MAX_STORY_DESCRIPTION_LEN: usize = 500;
pub const MAX_CHARACTER_NAME_LEN: usize = 100;
pub const MAX_CHARACTER_DESCRIPTION_LEN: usize = 1000;

/// A single reason a story cannot be saved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("Story title is required")]
    MissingStoryTitle,
    #[error("Story title must be at most {max} characters")]
    StoryTitleTooLong { max: usize },
    #[error("Story description is required")]
    MissingStoryDescription,
    #[error("Story description must be at most {max} characters")]
    StoryDescriptionTooLong { max: usize },
    #[error("Story must contain at least one node")]
    NoNodes,
    #[error("Story is missing a root node")]
    MissingRoot,
    #[error("Story has multiple root nodes ({count})")]
    MultipleRoots { count: usize },
    #[error("Node {node_id} is missing a title")]
    MissingNodeTitle { node_id: NodeId },
    #[error("Node {node_id} is missing content")]
    MissingNodeContent { node_id: NodeId },
    #[error("Node {node_id} has an invalid position ({x}, {y})")]
    InvalidPosition { node_id: NodeId, x: f32, y: f32 },
    #[error("Branch {branch_id} on node {node_id} is missing its text")]
    MissingBranchText { node_id: NodeId, branch_id: BranchId },
    #[error("Branch {branch_id} on node {node_id} points to missing node {target_id}")]
    UnresolvedTarget {
        node_id: NodeId,
        branch_id: BranchId,
        target_id: NodeId,
    },
    #[error("Character {character_id} is missing a name")]
    MissingCharacterName { character_id: CharacterId },
    #[error("Character {character_id} name must be at most {max} characters")]
    CharacterNameTooLong { character_id: CharacterId, max: usize },
    #[error("Character {character_id} description must be at most {max} characters")]
    CharacterDescriptionTooLong { character_id: CharacterId, max: usize },
}

/// All violations found in one pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Display strings, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Pre-save structural and field check over a whole story.
pub struct Validator;

impl Validator {
    pub fn validate(story: &Story) -> ValidationReport {
        let mut violations = Vec::new();

        let meta = &story.meta;
        if is_blank(&meta.title) {
            violations.push(Violation::MissingStoryTitle);
        } else if too_long(&meta.title, MAX_STORY_TITLE_LEN) {
            violations.push(Violation::StoryTitleTooLong {
                max: MAX_STORY_TITLE_LEN,
            });
        }
        if is_blank(&meta.description) {
            violations.push(Violation::MissingStoryDescription);
        } else if too_long(&meta.description, MAX_STORY_DESCRIPTION_LEN) {
            violations.push(Violation::StoryDescriptionTooLong {
                max: MAX_STORY_DESCRIPTION_LEN,
            });
        }

        let graph = &story.graph;
        if graph.is_empty() {
            violations.push(Violation::NoNodes);
        } else {
            match graph.nodes().filter(|n| n.is_root).count() {
                0 => violations.push(Violation::MissingRoot),
                1 => {}
                count => violations.push(Violation::MultipleRoots { count }),
            }
        }

        for node in graph.nodes() {
            if is_blank(&node.title) {
                violations.push(Violation::MissingNodeTitle {
                    node_id: node.id.clone(),
                });
            }
            if is_blank(&node.content) {
                violations.push(Violation::MissingNodeContent {
                    node_id: node.id.clone(),
                });
            }
            if !node.position.is_finite() {
                violations.push(Violation::InvalidPosition {
                    node_id: node.id.clone(),
                    x: node.position.x,
                    y: node.position.y,
                });
            }
            for branch in &node.branches {
                if is_blank(&branch.text) {
                    violations.push(Violation::MissingBranchText {
                        node_id: node.id.clone(),
                        branch_id: branch.id.clone(),
                    });
                }
                if !graph.contains(&branch.target_id) {
                    violations.push(Violation::UnresolvedTarget {
                        node_id: node.id.clone(),
                        branch_id: branch.id.clone(),
                        target_id: branch.target_id.clone(),
                    });
                }
            }
        }

        for character in &story.characters {
            if is_blank(&character.name) {
                violations.push(Violation::MissingCharacterName {
                    character_id: character.id.clone(),
                });
            } else if too_long(&character.name, MAX_CHARACTER_NAME_LEN) {
                violations.push(Violation::CharacterNameTooLong {
                    character_id: character.id.clone(),
                    max: MAX_CHARACTER_NAME_LEN,
                });
            }
            if character
                .description
                .as_deref()
                .is_some_and(|d| too_long(d, MAX_CHARACTER_DESCRIPTION_LEN))
            {
                violations.push(Violation::CharacterDescriptionTooLong {
                    character_id: character.id.clone(),
                    max: MAX_CHARACTER_DESCRIPTION_LEN,
                });
            }
        }

        if !violations.is_empty() {
            tracing::debug!("Validation found {} violation(s)", violations.len());
        }
        ValidationReport { violations }
    }
}
