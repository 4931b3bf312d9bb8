//! Native scene node types.

use crate::coords::Rect;
use crate::model::{Color, OverlayId, Point};
use std::fmt;

/// Handle of a node inside a [`super::SceneSurface`], assigned by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Native node kinds the scene knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Image,
    Rect,
    Ellipse,
    Line,
    Arrow,
    /// Freehand polyline
    Path,
    /// Editable sticky note (comment annotations)
    Note,
    /// Form field box
    Field,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Rect => "rect",
            NodeKind::Ellipse => "ellipse",
            NodeKind::Line => "line",
            NodeKind::Arrow => "arrow",
            NodeKind::Path => "path",
            NodeKind::Note => "note",
            NodeKind::Field => "field",
        }
    }

    /// Whether nodes of this kind accept in-place text editing.
    pub fn supports_text_edit(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::Note | NodeKind::Field)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View-space properties of a node.
///
/// Every length and coordinate is in pixels at the current zoom. Two props
/// values compare equal exactly when the surface would draw the same thing,
/// which is what keeps reconciliation idempotent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeProps {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees
    pub rotation: f64,
    pub opacity: f64,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    /// Polyline vertices for line, arrow and path nodes
    pub points: Vec<Point>,
    /// Asset reference an image node was loaded from
    pub source: Option<String>,
    /// Intrinsic pixel size of the loaded asset
    pub natural_size: Option<(u32, u32)>,
}

impl NodeProps {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Snapshot of one node as reported by [`super::SceneSurface::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Overlay this node renders; `None` for nodes the engine does not own
    pub binding: Option<OverlayId>,
    pub props: NodeProps,
}

impl SceneNode {
    pub fn is_bound_to(&self, overlay: &OverlayId) -> bool {
        self.binding.as_ref() == Some(overlay)
    }
}
