pub mod cascade;
pub mod config;
pub mod connector;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod store;
pub mod story;
pub mod validator;

pub use cascade::{CascadeDeleter, CascadeReport};
pub use config::EditorConfig;
pub use connector::{BranchConnector, Connector, ConnectorRouter, NodeFootprint, NodeShape};
pub use error::GraphError;
pub use geometry::{Rect, Vec2};
pub use layout::{LayoutEngine, Placement};
pub use store::{DragSession, EditSession, GraphStore, NewNodeSpec, NodeIndex, NodeUpdate};
pub use story::Story;
pub use validator::{
    MAX_CHARACTER_DESCRIPTION_LEN, MAX_CHARACTER_NAME_LEN, MAX_STORY_DESCRIPTION_LEN,
    MAX_STORY_TITLE_LEN, ValidationReport, Validator, Violation,
};
