//! Overlay model: the canonical, serializable representation of document edits.
//!
//! This module has no rendering dependency:
//! - [`Overlay`]: one element placed on a page, tagged by [`OverlayKind`]
//! - [`OverlayPatch`]: partial update merged into an existing overlay
//! - [`EditorDocument`]: page layout metadata plus the overlay list
//! - [`ExportSnapshot`]: the read-only view handed to export logic
//! - [`Color`]: parsed RGBA color used when styling scene nodes

pub mod color;
pub mod document;
pub mod overlay;
pub mod patch;

pub use color::Color;
pub use document::{DocMeta, EditorDocument, ExportSnapshot};
pub use overlay::{
    AnnotationKind, AnnotationOverlay, FieldType, FormOverlay, ImageOverlay, Overlay, OverlayId,
    OverlayKind, Point, ShapeKind, ShapeOverlay, SignatureMethod, SignatureOverlay, TextOverlay,
};
pub use patch::OverlayPatch;
