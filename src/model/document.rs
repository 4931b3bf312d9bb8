//! Document container and export snapshot.

use super::overlay::{Overlay, OverlayId};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The editable document: source file handle, page layout and overlays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorDocument {
    /// Opaque handle to the uploaded source document (absent until upload completes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub page_count: u32,
    /// Model-space width of the page currently driving layout
    pub page_width: f64,
    /// Model-space height of the page currently driving layout
    pub page_height: f64,
    /// Overlays in insertion order
    pub overlays: Vec<Overlay>,
}

impl EditorDocument {
    /// Creates an empty document with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, id: &OverlayId) -> Option<usize> {
        self.overlays.iter().position(|overlay| &overlay.id == id)
    }

    pub fn get(&self, id: &OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|overlay| &overlay.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &OverlayId) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|overlay| &overlay.id == id)
    }

    pub fn contains(&self, id: &OverlayId) -> bool {
        self.get(id).is_some()
    }

    /// Overlays placed on `page`, in insertion order.
    pub fn overlays_on_page(&self, page: u32) -> impl Iterator<Item = &Overlay> {
        self.overlays
            .iter()
            .filter(move |overlay| overlay.page == page)
    }

    /// Drops overlays whose id repeats an earlier one, keeping the first.
    ///
    /// Returns the number of overlays removed.
    pub fn dedupe_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.overlays.len();
        self.overlays.retain(|overlay| {
            if seen.insert(overlay.id.clone()) {
                true
            } else {
                warn!("Dropping overlay with duplicate id {}", overlay.id);
                false
            }
        });
        before - self.overlays.len()
    }

    /// Read-only view handed to export logic.
    pub fn export_snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            file_id: self.file_id.clone(),
            overlays: self.overlays.clone(),
            page_width: self.page_width,
            page_height: self.page_height,
        }
    }
}

/// Partial document metadata, merged by [`crate::DocumentStore::set_doc_meta`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocMeta {
    pub file_id: Option<String>,
    pub name: Option<String>,
    pub page_count: Option<u32>,
    pub page_width: Option<f64>,
    pub page_height: Option<f64>,
}

impl DocMeta {
    /// Metadata carrying only a model-space page size.
    pub fn page_size(width: f64, height: f64) -> Self {
        Self {
            page_width: Some(width),
            page_height: Some(height),
            ..Self::default()
        }
    }
}

/// The only artifact crossing into export logic.
///
/// Flat, insertion ordered, model space, free of scene references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub file_id: Option<String>,
    pub overlays: Vec<Overlay>,
    pub page_width: f64,
    pub page_height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::overlay::{OverlayKind, TextOverlay};

    fn text(id: &str, page: u32) -> Overlay {
        Overlay::new(id, page, OverlayKind::Text(TextOverlay::new(id)))
    }

    #[test]
    fn overlays_on_page_keeps_insertion_order() {
        let mut doc = EditorDocument::new();
        doc.overlays.push(text("a", 1));
        doc.overlays.push(text("b", 2));
        doc.overlays.push(text("c", 1));

        let ids: Vec<_> = doc.overlays_on_page(1).map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut doc = EditorDocument::new();
        doc.overlays.push(text("a", 1).at(1.0, 1.0));
        doc.overlays.push(text("a", 1).at(2.0, 2.0));
        doc.overlays.push(text("b", 1));

        assert_eq!(doc.dedupe_ids(), 1);
        assert_eq!(doc.overlays.len(), 2);
        assert_eq!(doc.get(&"a".into()).unwrap().x, 1.0);
    }

    #[test]
    fn export_snapshot_uses_camel_case_shape() {
        let mut doc = EditorDocument::new();
        doc.file_id = Some("file-1".into());
        doc.page_width = 612.0;
        doc.page_height = 792.0;
        doc.overlays.push(text("a", 1));

        let value = serde_json::to_value(doc.export_snapshot()).unwrap();
        assert_eq!(value["fileId"], "file-1");
        assert_eq!(value["pageWidth"], 612.0);
        assert_eq!(value["overlays"][0]["type"], "text");
    }

    #[test]
    fn document_json_round_trips_missing_fields_with_defaults() {
        let doc: EditorDocument = serde_json::from_str(r#"{"pageCount": 3}"#).unwrap();
        assert_eq!(doc.page_count, 3);
        assert!(doc.overlays.is_empty());
        assert!(doc.file_id.is_none());
    }
}
