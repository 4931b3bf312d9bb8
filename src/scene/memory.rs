//! In-memory scene surface.
//!
//! Reference implementation of [`SceneSurface`] used by the CLI and tests. It
//! records how many mutations the engine performed and can simulate the user
//! gestures a real canvas would report.

use super::SceneSurface;
use super::node::{NodeId, NodeKind, NodeProps, SceneNode};
use crate::input::{MouseButton, SceneEvent};
use crate::model::OverlayId;
use std::fmt::Write as _;

/// Number of engine-initiated calls per mutation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationCounts {
    pub inserts: usize,
    pub updates: usize,
    pub removes: usize,
    pub restacks: usize,
    pub selections: usize,
    pub edits: usize,
    pub resizes: usize,
}

impl MutationCounts {
    /// Node-level mutations (insert, update, remove, restack, selection, edit).
    pub fn total(&self) -> usize {
        self.inserts + self.updates + self.removes + self.restacks + self.selections + self.edits
    }
}

#[derive(Debug)]
pub struct MemoryScene {
    mounted: bool,
    nodes: Vec<SceneNode>,
    next_id: u64,
    active: Option<NodeId>,
    editing: Option<NodeId>,
    size: (f64, f64),
    mutations: MutationCounts,
    /// Native notifications waiting to be forwarded to the input router
    outbox: Vec<SceneEvent>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Creates a mounted, empty scene.
    pub fn new() -> Self {
        Self {
            mounted: true,
            nodes: Vec::new(),
            next_id: 1,
            active: None,
            editing: None,
            size: (0.0, 0.0),
            mutations: MutationCounts::default(),
            outbox: Vec::new(),
        }
    }

    /// Creates a scene that reports itself as not mounted yet.
    pub fn unmounted() -> Self {
        Self {
            mounted: false,
            ..Self::new()
        }
    }

    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }

    pub fn mutations(&self) -> MutationCounts {
        self.mutations
    }

    pub fn reset_mutations(&mut self) {
        self.mutations = MutationCounts::default();
    }

    pub fn size(&self) -> (f64, f64) {
        self.size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Overlay ids bound to nodes, bottom first.
    pub fn bound_ids(&self) -> Vec<OverlayId> {
        self.nodes
            .iter()
            .filter_map(|node| node.binding.clone())
            .collect()
    }

    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    /// Adds a host-owned node the engine must leave alone.
    pub fn insert_foreign(&mut self, kind: NodeKind, props: NodeProps) -> NodeId {
        self.push_node(kind, None, props)
    }

    /// Drains native notifications produced by engine calls such as
    /// [`SceneSurface::begin_text_edit`].
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Primary-button press at a view-space point.
    pub fn click(&self, x: f64, y: f64) -> SceneEvent {
        self.press(x, y, MouseButton::Left)
    }

    pub fn press(&self, x: f64, y: f64, button: MouseButton) -> SceneEvent {
        SceneEvent::PointerDown {
            x,
            y,
            button,
            target: self.hit_test(x, y).map(|node| node.id),
        }
    }

    pub fn double_click(&self, x: f64, y: f64) -> SceneEvent {
        SceneEvent::DoubleClick {
            x,
            y,
            target: self.hit_test(x, y).map(|node| node.id),
        }
    }

    /// Moves a node the way a user drag would and reports the drag end.
    pub fn drag(&mut self, node: NodeId, dx: f64, dy: f64) -> Option<SceneEvent> {
        let entry = self.nodes.iter_mut().find(|n| n.id == node)?;
        entry.props.x += dx;
        entry.props.y += dy;
        for point in &mut entry.props.points {
            point.x += dx;
            point.y += dy;
        }
        Some(SceneEvent::DragEnd { node })
    }

    /// Replaces the text of a node being edited and reports the change.
    pub fn type_text(&mut self, node: NodeId, text: &str) -> Option<SceneEvent> {
        let entry = self.nodes.iter_mut().find(|n| n.id == node)?;
        entry.props.text = Some(text.to_string());
        Some(SceneEvent::TextChanged {
            node,
            text: text.to_string(),
        })
    }

    /// Leaves text edit mode, e.g. on blur.
    pub fn exit_edit(&mut self) -> Option<SceneEvent> {
        self.editing
            .take()
            .map(|node| SceneEvent::EditExited { node })
    }

    /// Selection change made by the user through native handles.
    pub fn select_natively(&mut self, node: Option<NodeId>) -> SceneEvent {
        self.active = node;
        SceneEvent::SelectionChanged { node }
    }

    /// One line per node, bottom first.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            let binding = node
                .binding
                .as_ref()
                .map(OverlayId::as_str)
                .unwrap_or("-");
            let _ = write!(
                out,
                "{} {} {} at ({}, {}) size {}x{}",
                node.id,
                node.kind,
                binding,
                node.props.x,
                node.props.y,
                node.props.width,
                node.props.height
            );
            if let Some(text) = &node.props.text {
                let _ = write!(out, " text={text:?}");
            }
            if let Some((w, h)) = node.props.natural_size {
                let _ = write!(out, " natural={w}x{h}");
            }
            if self.active == Some(node.id) {
                out.push_str(" [active]");
            }
            out.push('\n');
        }
        out
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        binding: Option<OverlayId>,
        props: NodeProps,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id,
            kind,
            binding,
            props,
        });
        id
    }
}

impl SceneSurface for MemoryScene {
    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn nodes(&self) -> Vec<SceneNode> {
        self.nodes.clone()
    }

    fn insert(&mut self, kind: NodeKind, binding: &OverlayId, props: &NodeProps) -> NodeId {
        self.mutations.inserts += 1;
        self.push_node(kind, Some(binding.clone()), props.clone())
    }

    fn update(&mut self, node: NodeId, props: &NodeProps) {
        self.mutations.updates += 1;
        if let Some(entry) = self.nodes.iter_mut().find(|n| n.id == node) {
            entry.props = props.clone();
        }
    }

    fn remove(&mut self, node: NodeId) {
        self.mutations.removes += 1;
        self.nodes.retain(|n| n.id != node);
        if self.active == Some(node) {
            self.active = None;
        }
        if self.editing == Some(node) {
            self.editing = None;
        }
    }

    fn restack(&mut self, order: &[NodeId]) {
        self.mutations.restacks += 1;
        let slots: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| order.contains(&node.id))
            .map(|(index, _)| index)
            .collect();
        let mut reordered: Vec<SceneNode> = order
            .iter()
            .filter_map(|id| self.nodes.iter().find(|node| node.id == *id).cloned())
            .collect();
        if reordered.len() != slots.len() {
            return;
        }
        for (slot, node) in slots.into_iter().zip(reordered.drain(..)) {
            self.nodes[slot] = node;
        }
    }

    fn active(&self) -> Option<NodeId> {
        self.active
    }

    fn set_active(&mut self, node: Option<NodeId>) {
        self.mutations.selections += 1;
        self.active = node;
    }

    fn begin_text_edit(&mut self, node: NodeId) {
        self.mutations.edits += 1;
        self.editing = Some(node);
        self.outbox.push(SceneEvent::EditEntered { node });
    }

    fn is_editing(&self, node: NodeId) -> bool {
        self.editing == Some(node)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.mutations.resizes += 1;
        self.size = (width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(x: f64, y: f64) -> NodeProps {
        NodeProps {
            x,
            y,
            width: 10.0,
            height: 10.0,
            ..NodeProps::default()
        }
    }

    #[test]
    fn restack_keeps_foreign_slots() {
        let mut scene = MemoryScene::new();
        let guide = scene.insert_foreign(NodeKind::Rect, props(0.0, 0.0));
        let a = scene.insert(NodeKind::Text, &"a".into(), &props(0.0, 0.0));
        let b = scene.insert(NodeKind::Text, &"b".into(), &props(0.0, 0.0));

        scene.restack(&[b, a]);

        let ids: Vec<_> = scene.nodes().iter().map(|node| node.id).collect();
        assert_eq!(ids, [guide, b, a]);
    }

    #[test]
    fn hit_test_prefers_topmost_node() {
        let mut scene = MemoryScene::new();
        scene.insert(NodeKind::Rect, &"low".into(), &props(0.0, 0.0));
        let high = scene.insert(NodeKind::Rect, &"high".into(), &props(5.0, 5.0));

        match scene.click(7.0, 7.0) {
            SceneEvent::PointerDown { target, .. } => assert_eq!(target, Some(high)),
            other => panic!("unexpected event {other:?}"),
        }
        match scene.click(100.0, 100.0) {
            SceneEvent::PointerDown { target, .. } => assert_eq!(target, None),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn removing_a_node_clears_active_and_editing() {
        let mut scene = MemoryScene::new();
        let node = scene.insert(NodeKind::Text, &"t".into(), &props(0.0, 0.0));
        scene.set_active(Some(node));
        scene.begin_text_edit(node);
        assert_eq!(
            scene.drain_events(),
            vec![SceneEvent::EditEntered { node }]
        );

        scene.remove(node);
        assert_eq!(scene.active(), None);
        assert_eq!(scene.editing(), None);
        assert_eq!(scene.mutations().total(), 4);
    }
}
