//! Scene graph side of the engine.
//!
//! The native canvas is abstracted behind [`SceneSurface`]. The
//! [`Reconciler`] is the only code that creates, updates or removes
//! engine-owned nodes; everything it draws comes from the document store.

pub mod assets;
pub mod memory;
pub mod node;
pub mod project;
pub mod reconcile;


pub use assets::{
    AssetCompletion, AssetLoader, AssetRequest, LoadedAsset, ManualAssetLoader,
    ThreadedAssetLoader,
};
pub use memory::MemoryScene;
pub use node::{NodeId, NodeKind, NodeProps, SceneNode};
pub use project::SceneStyle;
pub use reconcile::{LoadOutcome, ReconcileContext, ReconcileReport, Reconciler};

use crate::model::OverlayId;

/// Adapter over a retained-mode canvas library.
///
/// Nodes are listed bottom to top. Nodes without a binding belong to the host
/// (guides, page chrome) and are never touched by the engine.
pub trait SceneSurface {
    /// Whether the native scene exists yet. Reconciliation is skipped until it does.
    fn is_mounted(&self) -> bool;

    /// All nodes in stacking order, bottom first.
    fn nodes(&self) -> Vec<SceneNode>;

    /// Creates a node on top of the stack, bound to `binding`.
    fn insert(&mut self, kind: NodeKind, binding: &OverlayId, props: &NodeProps) -> NodeId;

    fn update(&mut self, node: NodeId, props: &NodeProps);

    fn remove(&mut self, node: NodeId);

    /// Reorders the listed nodes so they stack in the given order, bottom first.
    ///
    /// Nodes not listed keep their slots.
    fn restack(&mut self, order: &[NodeId]);

    /// Node carrying the native selection handles, if any.
    fn active(&self) -> Option<NodeId>;

    fn set_active(&mut self, node: Option<NodeId>);

    /// Opens in-place text editing on `node` and gives it keyboard focus.
    fn begin_text_edit(&mut self, node: NodeId);

    fn is_editing(&self, node: NodeId) -> bool;

    /// Resizes the drawing area to the rendered page size in pixels.
    fn resize(&mut self, width: f64, height: f64);

    /// First node bound to `overlay`.
    fn find_bound(&self, overlay: &OverlayId) -> Option<SceneNode> {
        self.nodes()
            .into_iter()
            .find(|node| node.is_bound_to(overlay))
    }

    fn node(&self, id: NodeId) -> Option<SceneNode> {
        self.nodes().into_iter().find(|node| node.id == id)
    }

    /// Topmost node whose bounds contain the view-space point.
    fn hit_test(&self, x: f64, y: f64) -> Option<SceneNode> {
        self.nodes()
            .into_iter()
            .rev()
            .find(|node| node.props.bounds().contains(x, y))
    }
}
