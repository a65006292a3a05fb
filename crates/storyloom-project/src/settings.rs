use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use storyloom_graph::EditorConfig;

pub const SETTINGS_FILE_NAME: &str = "storyloom_settings.json";

/// Editor preferences persisted next to the stories they apply to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub editor: EditorConfig,
}

impl EditorSettings {
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }

    /// Read settings from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("writing settings {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let settings = EditorSettings::load_or_default(&EditorSettings::default_path(dir.path()))?;
        assert_eq!(settings, EditorSettings::default());
        Ok(())
    }

    #[test]
    fn test_settings_lifecycle() -> Result<()> {
        let dir = tempdir()?;
        let path = EditorSettings::default_path(dir.path());

        let mut settings = EditorSettings::default();
        settings.editor.node_width = 240.0;
        settings.editor.max_placement_attempts = 5;
        settings.save(&path)?;

        let loaded = EditorSettings::load_or_default(&path)?;
        assert_eq!(loaded.editor.node_width, 240.0);
        assert_eq!(loaded.editor.max_placement_attempts, 5);
        assert_eq!(loaded.editor.node_height, EditorConfig::DEFAULT_NODE_HEIGHT);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"editor":{"vertical_spacing":40.0}}"#)?;

        let loaded = EditorSettings::load_or_default(&path)?;
        assert_eq!(loaded.editor.vertical_spacing, 40.0);
        assert_eq!(loaded.editor.horizontal_offset, 200.0);
        Ok(())
    }
}
