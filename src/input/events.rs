//! Native scene notifications, normalized for the input router.

use crate::scene::NodeId;

/// Key representation for the few keys the router acts on.
///
/// Surface adapters map their native key codes to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Escape key
    Escape,
    /// Backspace key
    Backspace,
    /// Delete key
    Delete,
    /// Unmapped or unrecognized key
    Unknown,
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button; the only one that creates or selects
    Left,
    Right,
    Middle,
}

/// One notification from the native scene.
///
/// Coordinates are view-space pixels. Node handles refer to the surface the
/// event came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Button press; `target` is the topmost node under the pointer
    PointerDown {
        x: f64,
        y: f64,
        button: MouseButton,
        target: Option<NodeId>,
    },
    DoubleClick {
        x: f64,
        y: f64,
        target: Option<NodeId>,
    },
    /// A drag finished; the node's current position is final
    DragEnd { node: NodeId },
    /// Text of an editing node changed (fires on every keystroke)
    TextChanged { node: NodeId, text: String },
    EditEntered { node: NodeId },
    EditExited { node: NodeId },
    /// User changed the native selection (e.g. via handles or marquee)
    SelectionChanged { node: Option<NodeId> },
    KeyPressed { key: Key },
}
