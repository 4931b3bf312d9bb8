//! Keyed reconciliation of the scene graph against the overlay model.

use super::assets::{AssetCompletion, AssetLoader, AssetRequest};
use super::node::{NodeId, NodeKind, SceneNode};
use super::project::{SceneStyle, desired_props, native_kind};
use super::SceneSurface;
use crate::model::{Overlay, OverlayId};
use crate::store::DocumentStore;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Everything one reconciliation pass reads from the model side.
#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub page: u32,
    pub scale: f64,
    /// Overlays on `page`, in list (stacking) order
    pub overlays: Vec<&'a Overlay>,
    pub selected: Option<&'a OverlayId>,
    /// Overlay that should open for text editing once its node exists
    pub pending_edit: Option<&'a OverlayId>,
}

impl<'a> ReconcileContext<'a> {
    pub fn from_store(
        store: &'a DocumentStore,
        page: u32,
        scale: f64,
        pending_edit: Option<&'a OverlayId>,
    ) -> Self {
        Self {
            page,
            scale,
            overlays: store.overlays_on_page(page),
            selected: store.selected_id(),
            pending_edit,
        }
    }

    fn find(&self, id: &OverlayId) -> Option<&'a Overlay> {
        self.overlays.iter().copied().find(|overlay| &overlay.id == id)
    }
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Asset loads issued by this pass
    pub deferred: usize,
    pub restacked: bool,
    pub selection_changed: bool,
    pub edit_opened: Option<OverlayId>,
    /// The surface was not mounted; nothing was done
    pub skipped: bool,
}

impl ReconcileReport {
    /// Whether the pass touched the surface at all.
    pub fn is_noop(&self) -> bool {
        self.created == 0
            && self.updated == 0
            && self.removed == 0
            && self.deferred == 0
            && !self.restacked
            && !self.selection_changed
            && self.edit_opened.is_none()
    }
}

/// Result of applying one asset completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The node was created and bound
    Inserted(NodeId),
    /// The load failed; the placeholder stays without a node
    Failed,
    /// The completion no longer matches the model and was dropped
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderState {
    Loading,
    Failed,
}

/// Reservation of an overlay id while its asset loads.
#[derive(Debug, Clone, PartialEq)]
struct Placeholder {
    ticket: u64,
    reference: String,
    state: PlaceholderState,
}

/// Owns the model -> scene diff.
///
/// The only component that creates, updates or removes engine-owned nodes.
/// Nodes are matched to overlays by the id stored as their binding.
#[derive(Debug)]
pub struct Reconciler {
    style: SceneStyle,
    preserve_list_order: bool,
    placeholders: HashMap<OverlayId, Placeholder>,
    next_ticket: u64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(SceneStyle::default(), true)
    }
}

impl Reconciler {
    pub fn new(style: SceneStyle, preserve_list_order: bool) -> Self {
        Self {
            style,
            preserve_list_order,
            placeholders: HashMap::new(),
            next_ticket: 1,
        }
    }

    pub fn style(&self) -> &SceneStyle {
        &self.style
    }

    /// Whether `id` has a load in flight.
    pub fn is_loading(&self, id: &OverlayId) -> bool {
        self.placeholders
            .get(id)
            .is_some_and(|p| p.state == PlaceholderState::Loading)
    }

    /// Whether `id` has a failed load parked without a node.
    pub fn has_failed(&self, id: &OverlayId) -> bool {
        self.placeholders
            .get(id)
            .is_some_and(|p| p.state == PlaceholderState::Failed)
    }

    /// Forgets all placeholder bindings so in-flight completions are discarded.
    pub fn reset(&mut self) {
        if !self.placeholders.is_empty() {
            debug!(
                "Dropping {} placeholder bindings on reset",
                self.placeholders.len()
            );
        }
        self.placeholders.clear();
    }

    /// Brings `surface` into correspondence with the overlays in `ctx`.
    pub fn reconcile(
        &mut self,
        ctx: &ReconcileContext<'_>,
        surface: &mut dyn SceneSurface,
        loader: &mut dyn AssetLoader,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !surface.is_mounted() {
            debug!("Scene not mounted; skipping reconcile for page {}", ctx.page);
            report.skipped = true;
            return report;
        }

        let mut index: HashMap<OverlayId, SceneNode> = HashMap::new();
        for node in surface.nodes() {
            let Some(binding) = node.binding.clone() else {
                continue;
            };
            if index.contains_key(&binding) {
                debug!("Removing duplicate node {} bound to {}", node.id, binding);
                surface.remove(node.id);
                report.removed += 1;
            } else {
                index.insert(binding, node);
            }
        }

        let mut live: HashMap<OverlayId, NodeId> = HashMap::new();
        let mut list_order: Vec<NodeId> = Vec::new();

        for overlay in &ctx.overlays {
            let node_id = if overlay.is_image_backed() {
                self.reconcile_image(overlay, ctx, &mut index, surface, loader, &mut report)
            } else {
                Some(self.reconcile_plain(overlay, ctx, &mut index, surface, &mut report))
            };

            let Some(node_id) = node_id else {
                continue;
            };
            live.insert(overlay.id.clone(), node_id);
            list_order.push(node_id);

            if ctx.pending_edit == Some(&overlay.id)
                && overlay.is_text_editable()
                && !surface.is_editing(node_id)
            {
                surface.begin_text_edit(node_id);
                report.edit_opened = Some(overlay.id.clone());
            }
        }

        // Sole deletion path: bound nodes nobody claimed this pass.
        for (binding, node) in index {
            if !live.contains_key(&binding) {
                debug!("Removing node {} for departed overlay {}", node.id, binding);
                surface.remove(node.id);
                report.removed += 1;
            }
        }

        let on_page: HashSet<&OverlayId> = ctx.overlays.iter().map(|o| &o.id).collect();
        self.placeholders.retain(|id, _| on_page.contains(id));

        let desired_active = ctx.selected.and_then(|id| live.get(id).copied());
        if surface.active() != desired_active {
            surface.set_active(desired_active);
            report.selection_changed = true;
        }

        if self.preserve_list_order {
            let current: Vec<NodeId> = surface
                .nodes()
                .into_iter()
                .filter(|node| node.binding.is_some())
                .map(|node| node.id)
                .collect();
            if current != list_order {
                surface.restack(&list_order);
                report.restacked = true;
            }
        }

        if !report.is_noop() {
            debug!("Reconciled page {}: {:?}", ctx.page, report);
        }
        report
    }

    fn reconcile_plain(
        &self,
        overlay: &Overlay,
        ctx: &ReconcileContext<'_>,
        index: &mut HashMap<OverlayId, SceneNode>,
        surface: &mut dyn SceneSurface,
        report: &mut ReconcileReport,
    ) -> NodeId {
        let kind = native_kind(overlay);
        let props = desired_props(overlay, ctx.scale, &self.style, None);

        match index.remove(&overlay.id) {
            Some(node) if node.kind == kind => {
                if node.props != props {
                    surface.update(node.id, &props);
                    report.updated += 1;
                }
                node.id
            }
            stale => {
                if let Some(node) = stale {
                    debug!(
                        "Replacing {} node {} for overlay {} with {}",
                        node.kind, node.id, overlay.id, kind
                    );
                    surface.remove(node.id);
                    report.removed += 1;
                }
                report.created += 1;
                surface.insert(kind, &overlay.id, &props)
            }
        }
    }

    /// Image-backed overlays bind in two phases: a placeholder plus a load
    /// request here, the node itself in [`Reconciler::complete_load`].
    fn reconcile_image(
        &mut self,
        overlay: &Overlay,
        ctx: &ReconcileContext<'_>,
        index: &mut HashMap<OverlayId, SceneNode>,
        surface: &mut dyn SceneSurface,
        loader: &mut dyn AssetLoader,
        report: &mut ReconcileReport,
    ) -> Option<NodeId> {
        let reference = overlay.asset_reference();

        if let Some(node) = index.remove(&overlay.id) {
            let reusable = node.kind == NodeKind::Image
                && reference.is_some()
                && node.props.source.as_deref() == reference;
            if reusable {
                let props = desired_props(overlay, ctx.scale, &self.style, node.props.natural_size);
                if node.props != props {
                    surface.update(node.id, &props);
                    report.updated += 1;
                }
                self.placeholders.remove(&overlay.id);
                return Some(node.id);
            }

            debug!("Asset for overlay {} changed; replacing node {}", overlay.id, node.id);
            surface.remove(node.id);
            report.removed += 1;
        }

        let Some(reference) = reference else {
            debug!("Overlay {} has no asset reference; nothing to draw", overlay.id);
            self.placeholders.remove(&overlay.id);
            return None;
        };

        if self
            .placeholders
            .get(&overlay.id)
            .is_some_and(|p| p.reference == reference)
        {
            return None;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.placeholders.insert(
            overlay.id.clone(),
            Placeholder {
                ticket,
                reference: reference.to_string(),
                state: PlaceholderState::Loading,
            },
        );
        loader.request(AssetRequest {
            ticket,
            overlay_id: overlay.id.clone(),
            reference: reference.to_string(),
        });
        report.deferred += 1;
        None
    }

    /// Applies a finished load, re-validated against the current model.
    pub fn complete_load(
        &mut self,
        completion: AssetCompletion,
        ctx: &ReconcileContext<'_>,
        surface: &mut dyn SceneSurface,
    ) -> LoadOutcome {
        let AssetCompletion {
            ticket,
            overlay_id,
            reference,
            result,
        } = completion;

        let matches_placeholder = self.placeholders.get(&overlay_id).is_some_and(|p| {
            p.ticket == ticket && p.reference == reference && p.state == PlaceholderState::Loading
        });
        if !matches_placeholder {
            debug!("Discarding stale asset load {ticket} for overlay {overlay_id}");
            return LoadOutcome::Discarded;
        }

        let still_wanted = ctx.find(&overlay_id).filter(|overlay| {
            overlay.is_image_backed() && overlay.asset_reference() == Some(reference.as_str())
        });
        let Some(overlay) = still_wanted else {
            debug!("Overlay {overlay_id} changed while its asset loaded; discarding");
            self.placeholders.remove(&overlay_id);
            return LoadOutcome::Discarded;
        };

        if !surface.is_mounted() {
            debug!("Scene unmounted before asset for {overlay_id} arrived; will re-request");
            self.placeholders.remove(&overlay_id);
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(asset) => {
                self.placeholders.remove(&overlay_id);
                if let Some(existing) = surface.find_bound(&overlay_id) {
                    surface.remove(existing.id);
                }
                let natural = Some((asset.natural_width, asset.natural_height));
                let props = desired_props(overlay, ctx.scale, &self.style, natural);
                let node = surface.insert(NodeKind::Image, &overlay_id, &props);
                debug!("Bound image node {node} to overlay {overlay_id}");
                LoadOutcome::Inserted(node)
            }
            Err(err) => {
                warn!("Could not load asset for overlay {overlay_id}: {err}");
                if let Some(placeholder) = self.placeholders.get_mut(&overlay_id) {
                    placeholder.state = PlaceholderState::Failed;
                }
                LoadOutcome::Failed
            }
        }
    }
}
