//! Routes scene events to store mutations according to the active tool.

mod edit;
mod placement;
mod pointer;


use super::events::SceneEvent;
use crate::config::DefaultsConfig;
use crate::error::ModelError;
use crate::model::OverlayId;
use crate::scene::{NodeId, SceneSurface};
use crate::store::DocumentStore;
use log::debug;

/// Page and zoom the events were produced under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveView {
    /// 1-based page number
    pub page: u32,
    pub scale: f64,
}

/// Image or signature picked by the host before placing it with the Image or
/// Sign tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenAsset {
    /// File path or `data:` URL
    pub reference: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

/// Single entry point for native scene notifications.
///
/// Owns the interaction state that is not part of the document: the overlay
/// waiting to enter text edit mode, the overlay currently being edited and the
/// asset chosen for the next Image/Sign placement.
#[derive(Debug)]
pub struct InputRouter {
    defaults: DefaultsConfig,
    pending_edit: Option<OverlayId>,
    editing: Option<OverlayId>,
    chosen_asset: Option<ChosenAsset>,
    fields_created: u32,
    /// Set when router-only state changed in a way the scene must reflect
    needs_reconcile: bool,
}

impl InputRouter {
    pub fn new(defaults: DefaultsConfig) -> Self {
        Self {
            defaults,
            pending_edit: None,
            editing: None,
            chosen_asset: None,
            fields_created: 0,
            needs_reconcile: false,
        }
    }

    pub fn defaults(&self) -> &DefaultsConfig {
        &self.defaults
    }

    /// Overlay that should open for text editing once its node exists.
    pub fn pending_edit(&self) -> Option<&OverlayId> {
        self.pending_edit.as_ref()
    }

    /// Overlay whose node is currently in text edit mode.
    pub fn editing(&self) -> Option<&OverlayId> {
        self.editing.as_ref()
    }

    pub fn chosen_asset(&self) -> Option<&ChosenAsset> {
        self.chosen_asset.as_ref()
    }

    /// Records the asset the next Image/Sign placement will use.
    pub fn choose_asset(&mut self, asset: ChosenAsset) {
        debug!(
            "Chose asset {}x{} for placement",
            asset.natural_width, asset.natural_height
        );
        self.chosen_asset = Some(asset);
    }

    /// Returns and clears the reconcile request flag.
    pub fn take_needs_reconcile(&mut self) -> bool {
        std::mem::take(&mut self.needs_reconcile)
    }

    /// Drops interaction state that refers to overlays no longer in `store`.
    pub fn forget_missing(&mut self, store: &DocumentStore) {
        if self.pending_edit.as_ref().is_some_and(|id| !store.contains(id)) {
            self.pending_edit = None;
        }
        if self.editing.as_ref().is_some_and(|id| !store.contains(id)) {
            self.editing = None;
        }
    }

    /// Clears all interaction state, e.g. when a new document is loaded.
    pub fn reset(&mut self) {
        self.pending_edit = None;
        self.editing = None;
        self.chosen_asset = None;
        self.fields_created = 0;
        self.needs_reconcile = true;
    }

    /// Applies one native notification.
    ///
    /// Only the store and router state are mutated; callers reconcile the
    /// scene afterwards.
    pub fn dispatch(
        &mut self,
        event: SceneEvent,
        view: ActiveView,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) -> Result<(), ModelError> {
        match event {
            SceneEvent::PointerDown {
                x,
                y,
                button,
                target,
            } => self.on_pointer_down(x, y, button, target, view, store, surface),
            SceneEvent::DoubleClick { x, y, target } => {
                self.on_double_click(x, y, target, view, store, surface)
            }
            SceneEvent::DragEnd { node } => self.on_drag_end(node, view, store, surface),
            SceneEvent::TextChanged { node, text } => {
                self.on_text_changed(node, text, store, surface)
            }
            SceneEvent::EditEntered { node } => {
                self.on_edit_entered(node, surface);
                Ok(())
            }
            SceneEvent::EditExited { node } => {
                self.on_edit_exited(node);
                Ok(())
            }
            SceneEvent::SelectionChanged { node } => {
                self.on_selection_changed(node, store, surface);
                Ok(())
            }
            SceneEvent::KeyPressed { key } => {
                self.on_key(key, store);
                Ok(())
            }
        }
    }
}

/// Overlay bound to `node`, if the node exists and belongs to the engine.
fn bound_overlay(surface: &dyn SceneSurface, node: NodeId) -> Option<OverlayId> {
    surface.node(node).and_then(|node| node.binding)
}
