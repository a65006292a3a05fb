use storyloom_api::{
    ApiError, PayloadBranch, PayloadCharacter, PayloadNode, PersistencePayload, SavedStory,
};
use storyloom_graph::{Story, ValidationReport, Validator};
use thiserror::Error;

pub const GENERIC_SAVE_FAILURE: &str = "Failed to save story";

/// Failure reported by the persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The backend answered with an error body.
    #[error("{}", .0.server_message().unwrap_or(GENERIC_SAVE_FAILURE))]
    Rejected(ApiError),
    /// The backend could not be reached or gave no usable answer.
    #[error("Failed to save story")]
    Unavailable(String),
}

impl PersistenceError {
    /// Message to show the author: the server's own words when it sent any.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("Story is invalid: {0}")]
    Invalid(ValidationReport),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Backend that stores normalized stories.
pub trait StoryPersistence {
    fn save_story(&mut self, payload: &PersistencePayload) -> Result<SavedStory, PersistenceError>;
}

/// Flatten a story into the backend payload. Branches leave their owning
/// node and carry its id as `source_node_id`.
pub fn normalize(story: &Story) -> PersistencePayload {
    let graph = &story.graph;
    let nodes = graph
        .nodes()
        .map(|node| PayloadNode {
            id: node.id.clone(),
            title: node.title.clone(),
            content: node.content.clone(),
            node_type: node.node_type,
            x: node.position.x,
            y: node.position.y,
            is_root: node.is_root,
            media: node.media.clone(),
        })
        .collect();
    let branches = graph
        .nodes()
        .flat_map(|node| {
            node.branches.iter().map(move |branch| PayloadBranch {
                id: branch.id.clone(),
                source_node_id: node.id.clone(),
                target_node_id: branch.target_id.clone(),
                context: branch.text.clone(),
            })
        })
        .collect();
    let characters = story
        .characters
        .iter()
        .map(|c| PayloadCharacter {
            id: c.id.clone(),
            name: c.name.clone(),
            description: c.description.clone(),
        })
        .collect();

    PersistencePayload {
        title: story.meta.title.trim().to_string(),
        description: story.meta.description.trim().to_string(),
        cover_image: story
            .meta
            .cover_image
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        nodes,
        branches,
        characters,
    }
}

/// Validate, then normalize. Nothing is produced for an invalid story.
pub fn prepare_save(story: &Story) -> Result<PersistencePayload, SaveError> {
    let report = Validator::validate(story);
    if !report.is_valid() {
        tracing::warn!("Save blocked: {}", report);
        return Err(SaveError::Invalid(report));
    }
    Ok(normalize(story))
}

pub fn save_story<P>(story: &Story, persistence: &mut P) -> Result<SavedStory, SaveError>
where
    P: StoryPersistence + ?Sized,
{
    let payload = prepare_save(story)?;
    match persistence.save_story(&payload) {
        Ok(saved) => {
            tracing::info!(
                "Saved story {} ({} nodes, {} branches)",
                saved.story_id,
                payload.nodes.len(),
                payload.branches.len()
            );
            Ok(saved)
        }
        Err(err) => {
            tracing::error!("Saving story failed: {:?}", err);
            Err(err.into())
        }
    }
}
