use crate::save::SaveError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use storyloom_core::StoryMeta;
use storyloom_graph::{EditorConfig, Story, Validator};

/// A story bound to the JSON file it was loaded from or will be written to.
pub struct StoryFile {
    pub story: Story,
    pub path: PathBuf,
}

impl StoryFile {
    pub fn new(meta: StoryMeta, config: EditorConfig, path: PathBuf) -> Self {
        Self {
            story: Story::new(meta, config),
            path,
        }
    }

    /// Load a story written by [`StoryFile::save`] or [`export_story`].
    /// Ids, positions and timestamps are kept as stored.
    pub fn load(path: PathBuf, config: EditorConfig) -> Result<Self> {
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let mut story: Story =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        story.graph.set_config(config);
        if story.graph.is_empty() {
            story.graph.ensure_root();
        }
        tracing::debug!(
            "Loaded story {:?} with {} node(s) from {}",
            story.meta.title,
            story.graph.len(),
            path.display()
        );
        Ok(Self { story, path })
    }

    /// Write the story as-is, valid or not. Used for drafts.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.story)?;
        fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// Write the whole story as pretty JSON, refusing if it does not validate.
pub fn export_story(story: &Story, path: &Path) -> Result<()> {
    let report = Validator::validate(story);
    if !report.is_valid() {
        tracing::warn!("Export blocked: {}", report);
        return Err(SaveError::Invalid(report).into());
    }
    let content = serde_json::to_string_pretty(story)?;
    fs::write(path, content).with_context(|| format!("exporting to {}", path.display()))?;
    tracing::info!("Exported story to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloom_graph::NewNodeSpec;
    use tempfile::tempdir;

    #[test]
    fn test_story_file_lifecycle() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("caves.story.json");

        let mut file = StoryFile::new(
            StoryMeta::new("Caves", "A descent"),
            EditorConfig::default(),
            path.clone(),
        );
        let root = file.story.graph.ensure_root();
        let (branch, node) = file
            .story
            .graph
            .add_branch(&root, "go north", NewNodeSpec::default())?;
        file.story.add_character("Mira", None)?;
        file.save()?;

        let loaded = StoryFile::load(path, EditorConfig::default())?;
        let graph = &loaded.story.graph;
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.root_id(), Some(&root));
        assert_eq!(graph.node(&node.id), Some(&node));
        assert_eq!(graph.branch(&branch.id).map(|(owner, _)| &owner.id), Some(&root));
        assert_eq!(loaded.story.characters.len(), 1);
        Ok(())
    }

    #[test]
    fn test_export_blocks_invalid_story() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("export.json");

        let mut story = Story::new(StoryMeta::new("", "Desc"), EditorConfig::default());
        let err = export_story(&story, &path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SaveError>(),
            Some(SaveError::Invalid(_))
        ));
        assert!(!path.exists());

        story.meta.title = "Caves".to_string();
        export_story(&story, &path)?;
        let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(exported["meta"]["title"], "Caves");
        assert_eq!(exported["graph"]["nodes"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_load_applies_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("s.json");
        StoryFile::new(StoryMeta::new("S", "D"), EditorConfig::default(), path.clone()).save()?;

        let config = EditorConfig {
            horizontal_offset: 400.0,
            ..EditorConfig::default()
        };
        let mut loaded = StoryFile::load(path, config)?;
        let root = loaded.story.graph.ensure_root();
        let (_, node) = loaded
            .story
            .graph
            .add_branch(&root, "onwards", NewNodeSpec::default())?;
        assert_eq!(node.position.x, 500.0);
        Ok(())
    }
}
