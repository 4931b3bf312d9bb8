use super::{ActiveView, InputRouter, bound_overlay};
use crate::coords::point_to_model;
use crate::error::ModelError;
use crate::input::events::MouseButton;
use crate::input::tool::Tool;
use crate::model::{OverlayKind, OverlayPatch, Point};
use crate::scene::{NodeId, SceneSurface};
use crate::store::DocumentStore;
use log::debug;

impl InputRouter {
    /// Processes a button press.
    ///
    /// # Behavior
    /// - Non-primary buttons are ignored
    /// - A press on an engine-owned node selects its overlay, whatever the tool
    /// - A press on empty canvas does what the active tool says
    #[allow(clippy::too_many_arguments)]
    pub(super) fn on_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: MouseButton,
        target: Option<NodeId>,
        view: ActiveView,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) -> Result<(), ModelError> {
        if button != MouseButton::Left {
            debug!("Ignoring {:?} button press", button);
            return Ok(());
        }

        if let Some(id) = target.and_then(|node| bound_overlay(surface, node)) {
            store.select_overlay(Some(id));
            return Ok(());
        }

        match store.tool() {
            Tool::Select | Tool::Page => {
                store.select_overlay(None);
                Ok(())
            }
            Tool::Text => self.place_text(x, y, view, store),
            Tool::Shape => self.place_shape(x, y, view, store),
            Tool::Annotate => self.place_highlight(x, y, view, store),
            Tool::Form => self.place_field(x, y, view, store),
            tool @ (Tool::Image | Tool::Sign) => self.place_asset(tool, x, y, view, store),
        }
    }

    /// Double click re-enters text editing on editable overlays and creates a
    /// text box on empty canvas.
    pub(super) fn on_double_click(
        &mut self,
        x: f64,
        y: f64,
        target: Option<NodeId>,
        view: ActiveView,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) -> Result<(), ModelError> {
        let Some(id) = target.and_then(|node| bound_overlay(surface, node)) else {
            return self.place_text(x, y, view, store);
        };

        let editable = store
            .overlay(&id)
            .is_some_and(|overlay| overlay.is_text_editable());
        if editable {
            store.select_overlay(Some(id.clone()));
            self.pending_edit = Some(id);
            self.needs_reconcile = true;
        } else {
            store.select_overlay(Some(id));
        }
        Ok(())
    }

    /// Writes the node's final view position back to the model.
    pub(super) fn on_drag_end(
        &mut self,
        node: NodeId,
        view: ActiveView,
        store: &mut DocumentStore,
        surface: &dyn SceneSurface,
    ) -> Result<(), ModelError> {
        let Some(scene_node) = surface.node(node) else {
            debug!("Drag ended on vanished node {node}");
            return Ok(());
        };
        let Some(id) = scene_node.binding else {
            return Ok(());
        };

        let Some(overlay) = store.overlay(&id) else {
            debug!("Drag ended on node {node} for missing overlay {id}");
            return Ok(());
        };
        let origin = point_to_model(
            Point {
                x: scene_node.props.x,
                y: scene_node.props.y,
            },
            view.scale,
        );
        let (dx, dy) = (origin.x - overlay.x, origin.y - overlay.y);

        let mut patch = OverlayPatch::position(origin.x, origin.y);
        // Freehand paths are absolute; they travel with the box.
        if let OverlayKind::Annotation(annotation) = &overlay.kind {
            patch.points = annotation.points.as_ref().map(|points| {
                points
                    .iter()
                    .map(|p| Point {
                        x: p.x + dx,
                        y: p.y + dy,
                    })
                    .collect()
            });
        }
        store.update_overlay(&id, &patch)?;
        store.select_overlay(Some(id));
        Ok(())
    }
}
