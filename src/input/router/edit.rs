use super::{InputRouter, bound_overlay};
use crate::error::ModelError;
use crate::input::events::Key;
use crate::model::{OverlayKind, OverlayPatch};
use crate::scene::{NodeId, SceneSurface};
use crate::store::DocumentStore;
use log::debug;

impl InputRouter {
    /// Mirrors in-place text edits into the model on every change.
    ///
    /// Form fields take the text as their value; everything else as text.
    pub(super) fn on_text_changed(
        &mut self,
        node: NodeId,
        text: String,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) -> Result<(), ModelError> {
        let Some(id) = bound_overlay(surface, node) else {
            return Ok(());
        };

        let is_form = store
            .overlay(&id)
            .is_some_and(|overlay| matches!(overlay.kind, OverlayKind::Form(_)));
        let patch = if is_form {
            OverlayPatch::value(text)
        } else {
            OverlayPatch::text(text)
        };

        store.update_overlay(&id, &patch)?;
        store.select_overlay(Some(id));
        Ok(())
    }

    pub(super) fn on_edit_entered(&mut self, node: NodeId, surface: &dyn SceneSurface) {
        self.editing = bound_overlay(surface, node);
    }

    pub(super) fn on_edit_exited(&mut self, node: NodeId) {
        debug!("Text edit on {node} finished");
        self.pending_edit = None;
        self.editing = None;
    }

    pub(super) fn on_selection_changed(
        &mut self,
        node: Option<NodeId>,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) {
        let id = node.and_then(|node| bound_overlay(surface, node));
        store.select_overlay(id);
    }

    /// Handles keyboard shortcuts. Keys typed into an editing node belong to
    /// the editor and are ignored here.
    pub(super) fn on_key(&mut self, key: Key, store: &mut DocumentStore) {
        if self.editing.is_some() {
            return;
        }

        match key {
            Key::Delete | Key::Backspace => {
                if let Some(id) = store.selected_id().cloned() {
                    store.remove_overlay(&id);
                }
            }
            Key::Escape => store.select_overlay(None),
            Key::Unknown => {}
        }
    }
}
