use crate::config::EditorConfig;
use crate::geometry::{Rect, Vec2};
use storyloom_core::Position;

/// Outcome of placing a new node next to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    /// Number of candidate positions tested, including the accepted one.
    pub attempts: usize,
    /// `false` when the attempt bound was hit and the last candidate still overlaps.
    pub clear: bool,
}

/// Places nodes created as branch targets so they do not overlap existing nodes.
///
/// Candidates start one column to the right of the parent and walk straight
/// down one node-height-plus-spacing at a time. The walk is bounded, so a very
/// crowded column can still end in an overlapping placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    /// Fixed footprint of every node
    pub node_size: Vec2,
    pub horizontal_offset: f32,
    pub vertical_spacing: f32,
    pub max_attempts: usize,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl LayoutEngine {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            node_size: config.node_size(),
            horizontal_offset: config.horizontal_offset,
            vertical_spacing: config.vertical_spacing,
            max_attempts: config.max_placement_attempts.max(1),
        }
    }

    pub fn footprint(&self, position: Position) -> Rect {
        Rect::from_pos_size(position.into(), self.node_size)
    }

    fn overlaps_any(&self, candidate: &Rect, occupied: &[Rect]) -> bool {
        occupied.iter().any(|rect| rect.intersects(candidate))
    }

    /// Choose a position for a child of the node at `parent`, avoiding every
    /// position in `existing`.
    pub fn place_child<I>(&self, parent: Position, existing: I) -> Placement
    where
        I: IntoIterator<Item = Position>,
    {
        let occupied: Vec<Rect> = existing.into_iter().map(|p| self.footprint(p)).collect();
        let step = self.node_size.y + self.vertical_spacing;

        let mut candidate = Position::new(parent.x + self.horizontal_offset, parent.y);
        for attempt in 1..=self.max_attempts {
            if !self.overlaps_any(&self.footprint(candidate), &occupied) {
                return Placement {
                    position: candidate,
                    attempts: attempt,
                    clear: true,
                };
            }
            if attempt < self.max_attempts {
                candidate.y += step;
            }
        }

        tracing::warn!(
            "No free slot found after {} attempts; placing node at ({}, {}) anyway",
            self.max_attempts,
            candidate.x,
            candidate.y
        );
        Placement {
            position: candidate,
            attempts: self.max_attempts,
            clear: false,
        }
    }
}
