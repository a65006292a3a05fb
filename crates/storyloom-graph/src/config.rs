use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};
use storyloom_core::Position;

/// Canvas metrics shared by placement and connector routing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Distance from a parent's x to its new child's x.
    pub horizontal_offset: f32,
    /// Gap left between vertically stacked siblings.
    pub vertical_spacing: f32,
    pub max_placement_attempts: usize,
    pub root_position: Position,
}

impl EditorConfig {
    pub const DEFAULT_NODE_WIDTH: f32 = 180.0;
    pub const DEFAULT_NODE_HEIGHT: f32 = 100.0;
    pub const DEFAULT_HORIZONTAL_OFFSET: f32 = 200.0;
    pub const DEFAULT_VERTICAL_SPACING: f32 = 20.0;
    pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: usize = 20;

    pub fn node_size(&self) -> Vec2 {
        Vec2::new(self.node_width, self.node_height)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_width: Self::DEFAULT_NODE_WIDTH,
            node_height: Self::DEFAULT_NODE_HEIGHT,
            horizontal_offset: Self::DEFAULT_HORIZONTAL_OFFSET,
            vertical_spacing: Self::DEFAULT_VERTICAL_SPACING,
            max_placement_attempts: Self::DEFAULT_MAX_PLACEMENT_ATTEMPTS,
            root_position: Position::new(100.0, 100.0),
        }
    }
}
