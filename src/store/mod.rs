//! Document store: the single source of truth for overlays and editor state.
//!
//! All mutation goes through the methods on [`DocumentStore`]; each call
//! resolves synchronously. The scene reconciler only ever reads from here.

use crate::error::ModelError;
use crate::input::Tool;
use crate::model::{DocMeta, EditorDocument, ExportSnapshot, Overlay, OverlayId, OverlayPatch};
use log::{debug, info, warn};

/// Interactive editor state that is not part of the exported document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    /// Current tool state machine value
    pub tool: Tool,
    /// At most one selected overlay; may name an id that no longer exists
    pub selected_id: Option<OverlayId>,
}

/// Owns the overlay model plus document metadata and editor state.
///
/// Model errors (duplicate ids, updates to unknown ids, type-changing
/// updates) never corrupt the model. With strict checks enabled they panic so
/// they surface during development; otherwise they are logged and returned
/// as [`ModelError`] while the model stays untouched.
#[derive(Debug)]
pub struct DocumentStore {
    doc: EditorDocument,
    state: EditorState,
    revision: u64,
    doc_revision: u64,
    strict_checks: bool,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(cfg!(debug_assertions))
    }
}

impl DocumentStore {
    /// Creates an empty store.
    ///
    /// `strict_checks` turns model errors into panics.
    pub fn new(strict_checks: bool) -> Self {
        Self {
            doc: EditorDocument::new(),
            state: EditorState::default(),
            revision: 0,
            doc_revision: 0,
            strict_checks,
        }
    }

    pub fn document(&self) -> &EditorDocument {
        &self.doc
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.state.tool
    }

    pub fn selected_id(&self) -> Option<&OverlayId> {
        self.state.selected_id.as_ref()
    }

    /// Monotonic counter bumped by every mutation that changed something.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Like [`DocumentStore::revision`], but ignores selection and tool changes.
    pub fn document_revision(&self) -> u64 {
        self.doc_revision
    }

    pub fn overlay(&self, id: &OverlayId) -> Option<&Overlay> {
        self.doc.get(id)
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.doc.contains(id)
    }

    /// Overlays on `page` in insertion order.
    pub fn overlays_on_page(&self, page: u32) -> Vec<&Overlay> {
        self.doc.overlays_on_page(page).collect()
    }

    /// Appends an overlay. Its id must not already be present anywhere in the document.
    pub fn add_overlay(&mut self, overlay: Overlay) -> Result<(), ModelError> {
        if self.doc.contains(&overlay.id) {
            return self.reject(ModelError::DuplicateId(overlay.id));
        }

        debug!(
            "Adding {} overlay {} on page {}",
            overlay.type_name(),
            overlay.id,
            overlay.page
        );
        self.doc.overlays.push(overlay);
        self.bump_document();
        Ok(())
    }

    /// Merges `patch` into the overlay with `id`, preserving its variant.
    pub fn update_overlay(
        &mut self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<(), ModelError> {
        let Some(overlay) = self.doc.get_mut(id) else {
            return self.reject(ModelError::UnknownOverlay(id.clone()));
        };

        let before = overlay.clone();
        if let Err(err) = patch.apply_to(overlay) {
            return self.reject(err);
        }

        if *overlay != before {
            self.bump_document();
        }
        Ok(())
    }

    /// Removes the overlay with `id`; returns whether anything was removed.
    ///
    /// Removing an absent id is a no-op. A removed overlay is also deselected.
    pub fn remove_overlay(&mut self, id: &OverlayId) -> bool {
        let Some(index) = self.doc.position(id) else {
            return false;
        };

        self.doc.overlays.remove(index);
        if self.state.selected_id.as_ref() == Some(id) {
            self.state.selected_id = None;
        }
        debug!("Removed overlay {id}");
        self.bump_document();
        true
    }

    /// Sets the single selection. Selecting an unknown id is allowed.
    pub fn select_overlay(&mut self, id: Option<OverlayId>) {
        if self.state.selected_id != id {
            self.state.selected_id = id;
            self.bump();
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if self.state.tool != tool {
            debug!("Tool {} -> {}", self.state.tool, tool);
            self.state.tool = tool;
            self.bump();
        }
    }

    /// Merges page/layout metadata; returns whether anything changed.
    ///
    /// Page size changes are geometry changes: the bumped revision makes the
    /// session reconcile.
    pub fn set_doc_meta(&mut self, meta: DocMeta) -> bool {
        let before = (
            self.doc.file_id.clone(),
            self.doc.name.clone(),
            self.doc.page_count,
            self.doc.page_width,
            self.doc.page_height,
        );

        if meta.file_id.is_some() {
            self.doc.file_id = meta.file_id;
        }
        if meta.name.is_some() {
            self.doc.name = meta.name;
        }
        if let Some(count) = meta.page_count {
            self.doc.page_count = count;
        }
        if let Some(width) = meta.page_width {
            self.doc.page_width = width;
        }
        if let Some(height) = meta.page_height {
            self.doc.page_height = height;
        }

        let after = (
            self.doc.file_id.clone(),
            self.doc.name.clone(),
            self.doc.page_count,
            self.doc.page_width,
            self.doc.page_height,
        );
        let changed = before != after;
        if changed {
            self.bump_document();
        }
        changed
    }

    /// Clears overlays, metadata, selection and tool back to initial values.
    pub fn reset(&mut self) {
        self.doc = EditorDocument::new();
        self.state = EditorState::default();
        self.bump_document();
        info!("Document store reset");
    }

    /// Replaces the whole document, e.g. when restoring an autosave.
    ///
    /// Overlays repeating an earlier id are dropped so the id invariant holds.
    /// Returns the number of dropped overlays.
    pub fn replace_document(&mut self, mut doc: EditorDocument) -> usize {
        let dropped = doc.dedupe_ids();
        self.doc = doc;
        self.state = EditorState::default();
        self.bump_document();
        dropped
    }

    pub fn export_snapshot(&self) -> ExportSnapshot {
        self.doc.export_snapshot()
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn bump_document(&mut self) {
        self.doc_revision = self.doc_revision.wrapping_add(1);
        self.bump();
    }

    fn reject(&self, err: ModelError) -> Result<(), ModelError> {
        if self.strict_checks {
            panic!("overlay model error: {err}");
        }
        warn!("Ignoring invalid model mutation: {err}");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverlayKind, ShapeKind, ShapeOverlay, TextOverlay};

    fn lenient() -> DocumentStore {
        DocumentStore::new(false)
    }

    fn text(id: &str) -> Overlay {
        Overlay::new(id, 1, OverlayKind::Text(TextOverlay::new("New text"))).at(80.0, 120.0)
    }

    fn rect(id: &str) -> Overlay {
        Overlay::new(
            id,
            1,
            OverlayKind::Shape(ShapeOverlay {
                shape: ShapeKind::Rect,
                stroke: "#000".into(),
                stroke_width: 1.0,
                fill: None,
            }),
        )
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        store.add_overlay(rect("b")).unwrap();

        let ids: Vec<_> = store
            .document()
            .overlays
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn duplicate_id_is_rejected_without_changes() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        let revision = store.revision();

        let err = store.add_overlay(rect("a")).unwrap_err();
        assert_eq!(err, ModelError::DuplicateId("a".into()));
        assert_eq!(store.document().overlays.len(), 1);
        assert_eq!(store.overlay(&"a".into()).unwrap().type_name(), "text");
        assert_eq!(store.revision(), revision);
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn strict_store_panics_on_duplicate_id() {
        let mut store = DocumentStore::new(true);
        store.add_overlay(text("a")).unwrap();
        let _ = store.add_overlay(text("a"));
    }

    #[test]
    fn update_unknown_id_is_a_no_op() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        let before = store.document().clone();

        let err = store
            .update_overlay(&"missing".into(), &OverlayPatch::position(1.0, 1.0))
            .unwrap_err();
        assert_eq!(err, ModelError::UnknownOverlay("missing".into()));
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn type_changing_update_is_rejected() {
        let mut store = lenient();
        store.add_overlay(rect("s")).unwrap();

        let result = store.update_overlay(&"s".into(), &OverlayPatch::text("hello"));
        assert!(matches!(result, Err(ModelError::FieldMismatch { .. })));
        assert_eq!(store.overlay(&"s".into()).unwrap().type_name(), "shape");
    }

    #[test]
    fn identical_update_does_not_bump_revision() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        let revision = store.revision();

        store
            .update_overlay(&"a".into(), &OverlayPatch::position(80.0, 120.0))
            .unwrap();
        assert_eq!(store.revision(), revision);

        store
            .update_overlay(&"a".into(), &OverlayPatch::position(81.0, 120.0))
            .unwrap();
        assert_eq!(store.revision(), revision + 1);
    }

    #[test]
    fn remove_is_a_no_op_for_absent_ids_and_clears_selection() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        store.select_overlay(Some("a".into()));

        assert!(!store.remove_overlay(&"zzz".into()));
        assert!(store.remove_overlay(&"a".into()));
        assert!(store.selected_id().is_none());
        assert!(store.document().overlays.is_empty());
    }

    #[test]
    fn selecting_unknown_id_is_permitted() {
        let mut store = lenient();
        store.select_overlay(Some("ghost".into()));
        assert_eq!(store.selected_id(), Some(&"ghost".into()));
    }

    #[test]
    fn doc_meta_merges_and_reports_changes() {
        let mut store = lenient();
        assert!(store.set_doc_meta(DocMeta {
            name: Some("contract.pdf".into()),
            page_count: Some(3),
            ..DocMeta::default()
        }));
        assert!(store.set_doc_meta(DocMeta::page_size(612.0, 792.0)));
        assert!(!store.set_doc_meta(DocMeta::page_size(612.0, 792.0)));

        let doc = store.document();
        assert_eq!(doc.name.as_deref(), Some("contract.pdf"));
        assert_eq!(doc.page_count, 3);
        assert_eq!((doc.page_width, doc.page_height), (612.0, 792.0));
    }

    #[test]
    fn document_revision_ignores_editor_state() {
        let mut store = lenient();
        store.set_tool(Tool::Shape);
        store.select_overlay(Some("a".into()));
        assert_eq!(store.document_revision(), 0);
        assert_eq!(store.revision(), 2);

        store.add_overlay(text("a")).unwrap();
        store.update_overlay(&"a".into(), &OverlayPatch::position(5.0, 5.0)).unwrap();
        assert_eq!(store.document_revision(), 2);

        assert!(store.remove_overlay(&"a".into()));
        assert_eq!(store.document_revision(), 3);
    }

    #[test]
    fn reset_restores_initial_values() {
        let mut store = lenient();
        store.add_overlay(text("a")).unwrap();
        store.set_tool(Tool::Shape);
        store.select_overlay(Some("a".into()));
        store.set_doc_meta(DocMeta {
            file_id: Some("f".into()),
            ..DocMeta::default()
        });

        store.reset();

        assert!(store.document().overlays.is_empty());
        assert!(store.document().file_id.is_none());
        assert_eq!(store.tool(), Tool::Select);
        assert!(store.selected_id().is_none());
    }

    #[test]
    fn replace_document_drops_duplicate_ids() {
        let mut store = lenient();
        let mut doc = EditorDocument::new();
        doc.overlays.push(text("a"));
        doc.overlays.push(text("a"));

        assert_eq!(store.replace_document(doc), 1);
        assert_eq!(store.document().overlays.len(), 1);
    }
}
