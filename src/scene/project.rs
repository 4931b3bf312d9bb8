//! Projection of model overlays onto native node kinds and view-space props.

use super::node::{NodeKind, NodeProps};
use crate::coords::{point_to_view, to_view};
use crate::model::color::{BLACK, TRANSPARENT};
use crate::model::{AnnotationKind, Color, Overlay, OverlayKind, Point, ShapeKind};

/// Alpha applied to opaque highlight colors.
const HIGHLIGHT_ALPHA: f64 = 0.35;

/// Style values that overlays may leave unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub font_family: String,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
        }
    }
}

/// Native kind for an overlay. Closed mapping over every variant.
pub fn native_kind(overlay: &Overlay) -> NodeKind {
    match &overlay.kind {
        OverlayKind::Text(_) => NodeKind::Text,
        OverlayKind::Image(_) | OverlayKind::Signature(_) => NodeKind::Image,
        OverlayKind::Annotation(annotation) => match annotation.kind {
            AnnotationKind::Highlight => NodeKind::Rect,
            AnnotationKind::Underline | AnnotationKind::Strike => NodeKind::Line,
            AnnotationKind::Comment => NodeKind::Note,
            AnnotationKind::Freehand => NodeKind::Path,
        },
        OverlayKind::Shape(shape) => match shape.shape {
            ShapeKind::Rect => NodeKind::Rect,
            ShapeKind::Ellipse => NodeKind::Ellipse,
            ShapeKind::Line => NodeKind::Line,
            ShapeKind::Arrow => NodeKind::Arrow,
        },
        OverlayKind::Form(_) => NodeKind::Field,
    }
}

/// Computes the props a node for `overlay` should carry at `scale`.
///
/// `natural_size` is the loaded asset size for image-backed overlays.
pub fn desired_props(
    overlay: &Overlay,
    scale: f64,
    style: &SceneStyle,
    natural_size: Option<(u32, u32)>,
) -> NodeProps {
    let mut props = NodeProps {
        x: to_view(overlay.x, scale),
        y: to_view(overlay.y, scale),
        width: to_view(overlay.width, scale),
        height: to_view(overlay.height, scale),
        rotation: overlay.rotation.unwrap_or(0.0),
        opacity: overlay.opacity.unwrap_or(1.0),
        ..NodeProps::default()
    };

    match &overlay.kind {
        OverlayKind::Text(text) => {
            props.text = Some(text.text.clone());
            props.font_size = Some(to_view(text.font_size, scale));
            props.font_family = Some(
                text.font_family
                    .clone()
                    .unwrap_or_else(|| style.font_family.clone()),
            );
            props.fill = Some(Color::parse_or(&text.color, BLACK));
        }
        OverlayKind::Image(_) | OverlayKind::Signature(_) => {
            props.source = overlay.asset_reference().map(str::to_string);
            props.natural_size = natural_size;
        }
        OverlayKind::Annotation(annotation) => {
            let color = Color::parse_or(&annotation.color, BLACK);
            match annotation.kind {
                AnnotationKind::Highlight => {
                    let fill = if color.a >= 1.0 {
                        color.with_alpha(HIGHLIGHT_ALPHA)
                    } else {
                        color
                    };
                    props.fill = Some(fill);
                }
                AnnotationKind::Underline | AnnotationKind::Strike => {
                    let y = if annotation.kind == AnnotationKind::Underline {
                        props.y + props.height
                    } else {
                        props.y + props.height / 2.0
                    };
                    props.stroke = Some(color);
                    props.stroke_width = Some(annotation.thickness.unwrap_or(1.0));
                    props.points = vec![
                        Point { x: props.x, y },
                        Point {
                            x: props.x + props.width,
                            y,
                        },
                    ];
                }
                AnnotationKind::Comment => {
                    props.text = Some(annotation.text.clone().unwrap_or_default());
                    props.font_family = Some(style.font_family.clone());
                    props.fill = Some(color);
                }
                AnnotationKind::Freehand => {
                    props.stroke = Some(color);
                    props.stroke_width = Some(annotation.thickness.unwrap_or(1.0));
                    props.points = annotation
                        .points
                        .iter()
                        .flatten()
                        .map(|point| point_to_view(*point, scale))
                        .collect();
                }
            }
        }
        OverlayKind::Shape(shape) => {
            props.stroke = Some(Color::parse_or(&shape.stroke, BLACK));
            props.stroke_width = Some(shape.stroke_width);
            props.fill = shape
                .fill
                .as_deref()
                .map(|fill| Color::parse_or(fill, TRANSPARENT));
            if matches!(shape.shape, ShapeKind::Line | ShapeKind::Arrow) {
                props.points = vec![
                    Point {
                        x: props.x,
                        y: props.y,
                    },
                    Point {
                        x: props.x + props.width,
                        y: props.y + props.height,
                    },
                ];
            }
        }
        OverlayKind::Form(form) => {
            props.text = Some(form.value.clone().unwrap_or_else(|| form.name.clone()));
            props.font_family = Some(style.font_family.clone());
        }
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnnotationOverlay, FieldType, FormOverlay, ImageOverlay, ShapeOverlay, TextOverlay,
    };

    #[test]
    fn text_scales_geometry_and_font_but_not_rotation() {
        let mut overlay = Overlay::new("t1", 1, OverlayKind::Text(TextOverlay::new("Hi")))
            .at(80.0, 120.0)
            .sized(100.0, 20.0);
        overlay.rotation = Some(15.0);
        overlay.opacity = Some(0.5);

        let props = desired_props(&overlay, 1.5, &SceneStyle::default(), None);
        assert_eq!((props.x, props.y), (120.0, 180.0));
        assert_eq!((props.width, props.height), (150.0, 30.0));
        assert_eq!(props.font_size, Some(30.0));
        assert_eq!(props.rotation, 15.0);
        assert_eq!(props.opacity, 0.5);
        assert_eq!(props.font_family.as_deref(), Some("Inter"));
        assert_eq!(native_kind(&overlay), NodeKind::Text);
    }

    #[test]
    fn shape_stroke_width_is_not_scaled() {
        let overlay = Overlay::new(
            "s",
            1,
            OverlayKind::Shape(ShapeOverlay {
                shape: ShapeKind::Arrow,
                stroke: "#ff0000".into(),
                stroke_width: 3.0,
                fill: None,
            }),
        )
        .at(10.0, 10.0)
        .sized(20.0, 0.0);

        let props = desired_props(&overlay, 2.0, &SceneStyle::default(), None);
        assert_eq!(props.stroke_width, Some(3.0));
        assert_eq!(props.points[1], Point { x: 60.0, y: 20.0 });
        assert_eq!(native_kind(&overlay), NodeKind::Arrow);
    }

    #[test]
    fn highlight_gets_translucent_fill() {
        let overlay = Overlay::new(
            "h",
            1,
            OverlayKind::Annotation(AnnotationOverlay {
                kind: AnnotationKind::Highlight,
                color: "#f59e0b".into(),
                thickness: None,
                points: None,
                text: None,
            }),
        );

        let props = desired_props(&overlay, 1.0, &SceneStyle::default(), None);
        assert_eq!(props.fill.map(|c| c.a), Some(HIGHLIGHT_ALPHA));
        assert_eq!(native_kind(&overlay), NodeKind::Rect);
    }

    #[test]
    fn image_props_carry_source_and_natural_size() {
        let overlay = Overlay::new("i", 1, OverlayKind::Image(ImageOverlay::from_src("a.png")))
            .sized(100.0, 50.0);

        let props = desired_props(&overlay, 1.0, &SceneStyle::default(), Some((400, 200)));
        assert_eq!(props.source.as_deref(), Some("a.png"));
        assert_eq!(props.natural_size, Some((400, 200)));
        assert_eq!(native_kind(&overlay), NodeKind::Image);
    }

    #[test]
    fn form_field_shows_value_or_name() {
        let mut overlay = Overlay::new(
            "f",
            1,
            OverlayKind::Form(FormOverlay {
                field_type: FieldType::Text,
                name: "field-1".into(),
                value: None,
                required: None,
            }),
        );
        let props = desired_props(&overlay, 1.0, &SceneStyle::default(), None);
        assert_eq!(props.text.as_deref(), Some("field-1"));

        if let OverlayKind::Form(form) = &mut overlay.kind {
            form.value = Some("Jane".into());
        }
        let props = desired_props(&overlay, 1.0, &SceneStyle::default(), None);
        assert_eq!(props.text.as_deref(), Some("Jane"));
    }
}
