use super::{ActiveView, InputRouter};
use crate::coords::to_model;
use crate::error::ModelError;
use crate::input::tool::Tool;
use crate::model::{
    AnnotationKind, AnnotationOverlay, FieldType, FormOverlay, ImageOverlay, Overlay, OverlayId,
    OverlayKind, ShapeKind, ShapeOverlay, SignatureMethod, SignatureOverlay, TextOverlay,
};
use crate::store::DocumentStore;
use log::{debug, info};

impl InputRouter {
    /// Creates a text box at the press point and queues it for editing.
    pub(super) fn place_text(
        &mut self,
        x: f64,
        y: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<(), ModelError> {
        let defaults = &self.defaults.text;
        let kind = OverlayKind::Text(TextOverlay {
            text: defaults.placeholder.clone(),
            font_size: defaults.font_size,
            font_family: Some(defaults.font_family.clone()),
            color: defaults.color.to_css(),
        });
        let (width, height) = (defaults.width, defaults.height);

        let id = self.place(kind, x, y, width, height, view, store)?;
        self.pending_edit = Some(id);
        self.needs_reconcile = true;
        Ok(())
    }

    pub(super) fn place_shape(
        &mut self,
        x: f64,
        y: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<(), ModelError> {
        let defaults = &self.defaults.shape;
        let kind = OverlayKind::Shape(ShapeOverlay {
            shape: ShapeKind::Rect,
            stroke: defaults.stroke.to_css(),
            stroke_width: defaults.stroke_width,
            fill: Some(defaults.fill.to_css()),
        });
        let (width, height) = (defaults.width, defaults.height);

        self.place(kind, x, y, width, height, view, store)?;
        Ok(())
    }

    pub(super) fn place_highlight(
        &mut self,
        x: f64,
        y: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<(), ModelError> {
        let defaults = &self.defaults.annotation;
        let kind = OverlayKind::Annotation(AnnotationOverlay {
            kind: AnnotationKind::Highlight,
            color: defaults.color.to_css(),
            thickness: Some(defaults.thickness),
            points: None,
            text: None,
        });
        let (width, height) = (defaults.width, defaults.height);

        self.place(kind, x, y, width, height, view, store)?;
        Ok(())
    }

    /// Creates a text form field named `<prefix>-N`, skipping names in use.
    pub(super) fn place_field(
        &mut self,
        x: f64,
        y: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<(), ModelError> {
        let name = loop {
            self.fields_created += 1;
            let candidate = format!("{}-{}", self.defaults.form.name_prefix, self.fields_created);
            let taken = store.document().overlays.iter().any(|overlay| {
                matches!(&overlay.kind, OverlayKind::Form(form) if form.name == candidate)
            });
            if !taken {
                break candidate;
            }
        };

        let kind = OverlayKind::Form(FormOverlay {
            field_type: FieldType::Text,
            name,
            value: None,
            required: None,
        });
        let (width, height) = (self.defaults.form.width, self.defaults.form.height);

        self.place(kind, x, y, width, height, view, store)?;
        Ok(())
    }

    /// Places the chosen asset, keeping its aspect ratio and capping its
    /// width. Without a chosen asset this is a no-op.
    pub(super) fn place_asset(
        &mut self,
        tool: Tool,
        x: f64,
        y: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<(), ModelError> {
        let Some(asset) = self.chosen_asset.take() else {
            debug!("{tool} tool pressed without a chosen asset; ignoring");
            return Ok(());
        };

        let natural_width = f64::from(asset.natural_width.max(1));
        let natural_height = f64::from(asset.natural_height.max(1));
        let width = natural_width.min(self.defaults.image.max_width);
        let height = width * natural_height / natural_width;

        let is_inline = asset.reference.starts_with("data:");
        let (src, data) = if is_inline {
            (None, Some(asset.reference))
        } else {
            (Some(asset.reference), None)
        };
        let kind = match tool {
            Tool::Sign => OverlayKind::Signature(SignatureOverlay {
                method: SignatureMethod::Image,
                src,
                data,
            }),
            _ => OverlayKind::Image(ImageOverlay { src, data }),
        };

        self.place(kind, x, y, width, height, view, store)?;
        Ok(())
    }

    /// Adds an overlay whose top-left corner is at the view-space press point
    /// and whose size is given in view pixels, then selects it.
    #[allow(clippy::too_many_arguments)]
    fn place(
        &mut self,
        kind: OverlayKind,
        x: f64,
        y: f64,
        view_width: f64,
        view_height: f64,
        view: ActiveView,
        store: &mut DocumentStore,
    ) -> Result<OverlayId, ModelError> {
        let id = OverlayId::generate();
        let overlay = Overlay::new(id.clone(), view.page, kind)
            .at(to_model(x, view.scale), to_model(y, view.scale))
            .sized(
                to_model(view_width, view.scale),
                to_model(view_height, view.scale),
            );

        info!(
            "Placing {} overlay {} on page {} at ({:.1}, {:.1})",
            overlay.type_name(),
            id,
            view.page,
            overlay.x,
            overlay.y
        );
        store.add_overlay(overlay)?;
        store.select_overlay(Some(id.clone()));
        Ok(id)
    }
}
