use crate::CharacterId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Story-level fields shown on the story card and sent with every save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMeta {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl StoryMeta {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            cover_image: None,
        }
    }
}
