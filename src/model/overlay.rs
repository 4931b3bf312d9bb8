//! Overlay definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of an overlay across its whole lifetime.
///
/// Ids are unique across the entire document, not just per page. They are the
/// only link between the model and the scene graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(String);

impl OverlayId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random (v4 UUID) id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OverlayId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A point in model space (page points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One user-added element bound to a page and a position.
///
/// Geometry is always model space (PDF page points), never pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub id: OverlayId,
    /// 1-based page number
    pub page: u32,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Rotation in degrees; passes through the coordinate mapper unscaled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Opacity in 0.0..=1.0; passes through the coordinate mapper unscaled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Variant payload, tagged by `type` when serialized
    #[serde(flatten)]
    pub kind: OverlayKind,
}

/// Variant payload of an [`Overlay`].
///
/// Closed set: adding a variant forces every reconciliation and
/// serialization match to be revisited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverlayKind {
    Text(TextOverlay),
    Image(ImageOverlay),
    Annotation(AnnotationOverlay),
    Shape(ShapeOverlay),
    Form(FormOverlay),
    Signature(SignatureOverlay),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub text: String,
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    pub color: String,
}

impl TextOverlay {
    /// Text with the stock editor style (20pt, dark slate).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 20.0,
            font_family: None,
            color: "#1c2230".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverlay {
    /// Resolvable resource reference (file path or URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Inline payload, usually a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ImageOverlay {
    pub fn from_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMethod {
    Draw,
    Type,
    #[default]
    Image,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureOverlay {
    #[serde(default)]
    pub method: SignatureMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Highlight,
    Underline,
    Strike,
    Comment,
    Freehand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationOverlay {
    pub kind: AnnotationKind,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    /// Freehand path in model space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Line,
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeOverlay {
    pub shape: ShapeKind,
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Checkbox,
    Radio,
    Dropdown,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOverlay {
    pub field_type: FieldType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Overlay {
    /// Creates an overlay at the page origin with zero size.
    ///
    /// Chain [`Overlay::at`] and [`Overlay::sized`] to place it.
    pub fn new(id: impl Into<OverlayId>, page: u32, kind: OverlayKind) -> Self {
        Self {
            id: id.into(),
            page,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: None,
            opacity: None,
            kind,
        }
    }

    /// Moves the overlay to model-space `(x, y)`.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Sets the model-space size.
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Serialized `type` tag of the variant.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Asset reference for image-backed overlays (`src` first, then inline `data`).
    pub fn asset_reference(&self) -> Option<&str> {
        let (src, data) = match &self.kind {
            OverlayKind::Image(image) => (&image.src, &image.data),
            OverlayKind::Signature(signature) => (&signature.src, &signature.data),
            _ => return None,
        };
        src.as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| data.as_deref().filter(|d| !d.is_empty()))
    }

    /// Whether the overlay is backed by an asynchronously loaded asset.
    pub fn is_image_backed(&self) -> bool {
        matches!(
            self.kind,
            OverlayKind::Image(_) | OverlayKind::Signature(_)
        )
    }

    /// Whether the scene node for this overlay supports in-place text editing.
    pub fn is_text_editable(&self) -> bool {
        match &self.kind {
            OverlayKind::Text(_) => true,
            OverlayKind::Annotation(annotation) => annotation.kind == AnnotationKind::Comment,
            OverlayKind::Form(form) => form.field_type == FieldType::Text,
            OverlayKind::Image(_) | OverlayKind::Shape(_) | OverlayKind::Signature(_) => false,
        }
    }
}

impl OverlayKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            OverlayKind::Text(_) => "text",
            OverlayKind::Image(_) => "image",
            OverlayKind::Annotation(_) => "annotation",
            OverlayKind::Shape(_) => "shape",
            OverlayKind::Form(_) => "form",
            OverlayKind::Signature(_) => "signature",
        }
    }
}
