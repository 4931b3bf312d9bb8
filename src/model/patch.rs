//! Partial overlay updates.

use super::overlay::{Overlay, OverlayKind, Point};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Set of fields to merge into an existing overlay.
///
/// A patch carries neither `id` nor `type`, so applying it can never change an
/// overlay's identity or variant. Base fields apply to every variant; the
/// remaining fields only apply to the variants that own them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayPatch {
    pub page: Option<u32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,

    /// Text, comment annotation body
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    /// Text and annotation color
    pub color: Option<String>,

    /// Image and signature asset reference
    pub src: Option<String>,
    pub data: Option<String>,

    pub thickness: Option<f64>,
    pub points: Option<Vec<Point>>,

    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub fill: Option<String>,

    pub name: Option<String>,
    pub value: Option<String>,
    pub required: Option<bool>,
}

impl OverlayPatch {
    /// Patch that moves an overlay to model-space `(x, y)`.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that replaces the text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that replaces a form field value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the first populated field that the given variant does not own.
    fn foreign_field(&self, kind: &OverlayKind) -> Option<&'static str> {
        let is_text = matches!(kind, OverlayKind::Text(_));
        let is_annotation = matches!(kind, OverlayKind::Annotation(_));
        let is_image = matches!(kind, OverlayKind::Image(_) | OverlayKind::Signature(_));
        let is_shape = matches!(kind, OverlayKind::Shape(_));
        let is_form = matches!(kind, OverlayKind::Form(_));

        let checks: [(&'static str, bool, bool); 13] = [
            ("text", self.text.is_some(), is_text || is_annotation),
            ("fontSize", self.font_size.is_some(), is_text),
            ("fontFamily", self.font_family.is_some(), is_text),
            ("color", self.color.is_some(), is_text || is_annotation),
            ("src", self.src.is_some(), is_image),
            ("data", self.data.is_some(), is_image),
            ("thickness", self.thickness.is_some(), is_annotation),
            ("points", self.points.is_some(), is_annotation),
            ("stroke", self.stroke.is_some(), is_shape),
            ("strokeWidth", self.stroke_width.is_some(), is_shape),
            ("fill", self.fill.is_some(), is_shape),
            ("name", self.name.is_some(), is_form),
            ("value", self.value.is_some() || self.required.is_some(), is_form),
        ];

        checks
            .iter()
            .find(|(_, present, allowed)| *present && !*allowed)
            .map(|(field, _, _)| *field)
    }

    /// Merges the patch into `overlay`.
    ///
    /// Validation happens before any field is written, so a rejected patch
    /// leaves the overlay untouched.
    pub(crate) fn apply_to(&self, overlay: &mut Overlay) -> Result<(), ModelError> {
        if let Some(field) = self.foreign_field(&overlay.kind) {
            return Err(ModelError::FieldMismatch {
                id: overlay.id.clone(),
                kind: overlay.type_name(),
                field,
            });
        }

        if let Some(page) = self.page {
            overlay.page = page;
        }
        if let Some(x) = self.x {
            overlay.x = x;
        }
        if let Some(y) = self.y {
            overlay.y = y;
        }
        if let Some(width) = self.width {
            overlay.width = width;
        }
        if let Some(height) = self.height {
            overlay.height = height;
        }
        if self.rotation.is_some() {
            overlay.rotation = self.rotation;
        }
        if self.opacity.is_some() {
            overlay.opacity = self.opacity;
        }

        match &mut overlay.kind {
            OverlayKind::Text(text) => {
                if let Some(value) = &self.text {
                    text.text = value.clone();
                }
                if let Some(size) = self.font_size {
                    text.font_size = size;
                }
                if self.font_family.is_some() {
                    text.font_family = self.font_family.clone();
                }
                if let Some(color) = &self.color {
                    text.color = color.clone();
                }
            }
            OverlayKind::Image(image) => {
                if self.src.is_some() {
                    image.src = self.src.clone();
                }
                if self.data.is_some() {
                    image.data = self.data.clone();
                }
            }
            OverlayKind::Signature(signature) => {
                if self.src.is_some() {
                    signature.src = self.src.clone();
                }
                if self.data.is_some() {
                    signature.data = self.data.clone();
                }
            }
            OverlayKind::Annotation(annotation) => {
                if self.text.is_some() {
                    annotation.text = self.text.clone();
                }
                if let Some(color) = &self.color {
                    annotation.color = color.clone();
                }
                if self.thickness.is_some() {
                    annotation.thickness = self.thickness;
                }
                if self.points.is_some() {
                    annotation.points = self.points.clone();
                }
            }
            OverlayKind::Shape(shape) => {
                if let Some(stroke) = &self.stroke {
                    shape.stroke = stroke.clone();
                }
                if let Some(width) = self.stroke_width {
                    shape.stroke_width = width;
                }
                if self.fill.is_some() {
                    shape.fill = self.fill.clone();
                }
            }
            OverlayKind::Form(form) => {
                if let Some(name) = &self.name {
                    form.name = name.clone();
                }
                if self.value.is_some() {
                    form.value = self.value.clone();
                }
                if self.required.is_some() {
                    form.required = self.required;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::overlay::{ShapeKind, ShapeOverlay, TextOverlay};

    fn text_overlay() -> Overlay {
        Overlay::new("t1", 1, OverlayKind::Text(TextOverlay::new("New text")))
            .at(80.0, 120.0)
            .sized(100.0, 20.0)
    }

    #[test]
    fn position_patch_moves_overlay_and_keeps_variant() {
        let mut overlay = text_overlay();
        OverlayPatch::position(10.0, 15.0)
            .apply_to(&mut overlay)
            .unwrap();

        assert_eq!((overlay.x, overlay.y), (10.0, 15.0));
        assert_eq!(overlay.type_name(), "text");
        assert_eq!(overlay.width, 100.0);
    }

    #[test]
    fn text_patch_merges_style_fields() {
        let mut overlay = text_overlay();
        OverlayPatch::text("Edited")
            .with_color("#ff0000")
            .apply_to(&mut overlay)
            .unwrap();

        let OverlayKind::Text(text) = &overlay.kind else {
            panic!("variant changed");
        };
        assert_eq!(text.text, "Edited");
        assert_eq!(text.color, "#ff0000");
        assert_eq!(text.font_size, 20.0);
    }

    #[test]
    fn foreign_field_is_rejected_without_partial_writes() {
        let mut overlay = Overlay::new(
            "s1",
            1,
            OverlayKind::Shape(ShapeOverlay {
                shape: ShapeKind::Rect,
                stroke: "#000".into(),
                stroke_width: 1.0,
                fill: None,
            }),
        );
        let before = overlay.clone();

        let patch = OverlayPatch {
            x: Some(50.0),
            text: Some("nope".into()),
            ..OverlayPatch::default()
        };
        let err = patch.apply_to(&mut overlay).unwrap_err();

        assert_eq!(
            err,
            ModelError::FieldMismatch {
                id: "s1".into(),
                kind: "shape",
                field: "text",
            }
        );
        assert_eq!(overlay, before);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(OverlayPatch::default().is_empty());
        assert!(!OverlayPatch::position(0.0, 0.0).is_empty());
    }
}
