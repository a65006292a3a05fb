use crate::config::EditorConfig;
use crate::geometry::{Rect, Vec2};
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use storyloom_core::{BranchId, NodeId, NodeType, StoryNode};

/// Outline of a node as seen by the connector router.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeShape {
    Rectangle { half_width: f32, half_height: f32 },
    Circle { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeFootprint {
    pub center: Vec2,
    pub shape: NodeShape,
}

impl NodeFootprint {
    pub fn rectangle(rect: Rect) -> Self {
        Self {
            center: rect.center(),
            shape: NodeShape::Rectangle {
                half_width: rect.width() * 0.5,
                half_height: rect.height() * 0.5,
            },
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            shape: NodeShape::Circle { radius },
        }
    }

    /// Anchor on the outline facing the unit vector `dir`. Circles use the
    /// exact ray exit; rectangles pick the side by the dominant axis of `dir`.
    pub fn boundary_point(&self, dir: Vec2) -> Vec2 {
        let c = self.center;
        match self.shape {
            // dir is (cos θ, sin θ) of the ray angle.
            NodeShape::Circle { radius } => c + dir * radius,
            NodeShape::Rectangle {
                half_width,
                half_height,
            } => {
                // Mostly horizontal leaves through left/right, otherwise top/bottom.
                // The offset along that side is the slope scaled by the other half-extent.
                if dir.x.abs() > dir.y.abs() {
                    Vec2::new(
                        c.x + half_width * dir.x.signum(),
                        c.y + half_height * dir.y / dir.x.abs(),
                    )
                } else {
                    Vec2::new(
                        c.x + half_width * dir.x / dir.y.abs(),
                        c.y + half_height * dir.y.signum(),
                    )
                }
            }
        }
    }
}

/// A rendered connector segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub start: Vec2,
    pub end: Vec2,
    pub length: f32,
    /// Rotation of the segment in degrees, `atan2` convention (y grows downwards on canvas).
    pub angle_degrees: f32,
}

impl Connector {
    fn between(start: Vec2, end: Vec2) -> Self {
        let delta = end - start;
        Self {
            start,
            end,
            length: delta.length(),
            angle_degrees: delta.y.atan2(delta.x).to_degrees(),
        }
    }

    /// Anchor for the branch label.
    pub fn midpoint(&self) -> Vec2 {
        Vec2::new(
            (self.start.x + self.end.x) * 0.5,
            (self.start.y + self.end.y) * 0.5,
        )
    }

    pub fn is_degenerate(&self) -> bool {
        self.length <= f32::EPSILON
    }
}

/// Connector for one branch, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchConnector {
    pub branch_id: BranchId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub label: String,
    pub connector: Connector,
}

/// Computes boundary-to-boundary connectors between node footprints.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorRouter {
    pub node_size: Vec2,
}

impl Default for ConnectorRouter {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ConnectorRouter {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            node_size: config.node_size(),
        }
    }

    /// Footprint of a node: `End` nodes are drawn as circles inscribed in the
    /// node box, everything else as the box itself.
    pub fn footprint(&self, node: &StoryNode) -> NodeFootprint {
        let rect = Rect::from_pos_size(node.position.into(), self.node_size);
        match node.node_type {
            NodeType::End => {
                NodeFootprint::circle(rect.center(), rect.width().min(rect.height()) * 0.5)
            }
            NodeType::Regular | NodeType::Branch => NodeFootprint::rectangle(rect),
        }
    }

    /// Route a connector from `source` to `target`.
    ///
    /// The source exits along the center-to-center direction and the target is
    /// entered along the reverse direction. Coincident centers give a
    /// zero-length connector at the shared center.
    pub fn route(&self, source: &NodeFootprint, target: &NodeFootprint) -> Connector {
        let delta = target.center - source.center;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return Connector {
                start: source.center,
                end: source.center,
                length: 0.0,
                angle_degrees: 0.0,
            };
        }

        let dir = delta * (1.0 / distance);
        let start = source.boundary_point(dir);
        let end = target.boundary_point(-dir);
        Connector::between(start, end)
    }

    pub fn route_nodes(&self, source: &StoryNode, target: &StoryNode) -> Connector {
        self.route(&self.footprint(source), &self.footprint(target))
    }

    /// Connectors for every branch in the store, in node then branch order.
    ///
    /// Branches whose target cannot be resolved are skipped with a warning.
    pub fn route_branches(&self, store: &GraphStore) -> Vec<BranchConnector> {
        let mut connectors = Vec::with_capacity(store.branch_count());
        for source in store.nodes() {
            for branch in &source.branches {
                let Some(target) = store.node(&branch.target_id) else {
                    tracing::warn!(
                        "Skipping connector for branch {}: target {} is missing",
                        branch.id,
                        branch.target_id
                    );
                    continue;
                };
                connectors.push(BranchConnector {
                    branch_id: branch.id.clone(),
                    source_id: source.id.clone(),
                    target_id: target.id.clone(),
                    label: branch.text.clone(),
                    connector: self.route_nodes(source, target),
                });
            }
        }
        connectors
    }
}
