mod editor;
mod save;
mod settings;
mod story_file;

pub use editor::StoryEditor;
pub use save::{
    normalize, prepare_save, save_story, PersistenceError, SaveError, StoryPersistence,
    GENERIC_SAVE_FAILURE,
};
pub use settings::{EditorSettings, SETTINGS_FILE_NAME};
pub use story_file::{export_story, StoryFile};
