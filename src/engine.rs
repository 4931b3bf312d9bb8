//! Editor session: owns the store, the reconciler and the input router, and
//! keeps the scene in step with the model.
//!
//! A host drives the session from its event loop:
//! - forward native notifications with [`EditorSession::dispatch`]
//! - call [`EditorSession::pump_assets`] when asset loads may have finished
//! - change page or zoom with [`EditorSession::set_view`]
//!
//! Every call that changes the model reconciles before returning. With
//! autosave enabled, every call that changes the document also writes it to
//! disk; write failures are logged and never reach the caller.

use crate::autosave::{self, AutosaveOptions};
use crate::config::{Config, ViewConfig};
use crate::coords::is_valid_scale;
use crate::error::SessionError;
use crate::input::{ActiveView, ChosenAsset, InputRouter, SceneEvent, Tool};
use crate::model::{DocMeta, EditorDocument, ExportSnapshot, Overlay, OverlayId, OverlayPatch};
use crate::scene::{
    AssetCompletion, AssetLoader, LoadOutcome, ReconcileContext, ReconcileReport, Reconciler,
    SceneStyle, SceneSurface,
};
use crate::store::DocumentStore;
use log::{debug, info, warn};

/// Rendered page size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Page rasterizer seam. The engine only needs page sizes from it.
pub trait PageRenderer {
    fn page_count(&self) -> u32;

    /// Pixel size of `page` rendered at `scale`, or `None` if the page does not exist.
    fn viewport(&self, page: u32, scale: f64) -> Option<Viewport>;
}

/// Renderer for documents whose pages all share one size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPageRenderer {
    pub page_count: u32,
    pub page_width: f64,
    pub page_height: f64,
}

impl FixedPageRenderer {
    pub fn new(page_count: u32, page_width: f64, page_height: f64) -> Self {
        Self {
            page_count,
            page_width,
            page_height,
        }
    }

    /// US Letter pages (612 x 792 points).
    pub fn letter(page_count: u32) -> Self {
        Self::new(page_count, 612.0, 792.0)
    }
}

impl PageRenderer for FixedPageRenderer {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn viewport(&self, page: u32, scale: f64) -> Option<Viewport> {
        if page == 0 || page > self.page_count {
            return None;
        }
        Some(Viewport {
            width: self.page_width * scale,
            height: self.page_height * scale,
        })
    }
}

pub struct EditorSession<S, L, R> {
    store: DocumentStore,
    reconciler: Reconciler,
    router: InputRouter,
    surface: S,
    loader: L,
    renderer: R,
    view_limits: ViewConfig,
    page: u32,
    scale: f64,
    /// Store revision the scene last matched; `None` forces the next pass
    synced_revision: Option<u64>,
    autosave: Option<AutosaveOptions>,
    /// Document revision last written to (or restored from) the autosave file
    saved_revision: u64,
}

impl<S, L, R> EditorSession<S, L, R>
where
    S: SceneSurface,
    L: AssetLoader,
    R: PageRenderer,
{
    /// Creates a session showing page 1 at `config.view.initial_scale`.
    ///
    /// When `config.autosave.enabled` is set, document changes made after
    /// construction are autosaved. The existing autosave file is left alone
    /// until the first change.
    pub fn new(config: &Config, surface: S, loader: L, renderer: R) -> Result<Self, SessionError> {
        let style = SceneStyle {
            font_family: config.defaults.text.font_family.clone(),
        };
        let mut session = Self {
            store: DocumentStore::new(config.model.strict()),
            reconciler: Reconciler::new(style, config.scene.preserve_list_order),
            router: InputRouter::new(config.defaults.clone()),
            surface,
            loader,
            renderer,
            view_limits: config.view.clone(),
            page: 1,
            scale: config.view.initial_scale,
            synced_revision: None,
            autosave: None,
            saved_revision: 0,
        };

        let page_count = session.renderer.page_count();
        session.store.set_doc_meta(DocMeta {
            page_count: Some(page_count),
            ..DocMeta::default()
        });
        session.set_view(1, config.view.initial_scale)?;
        if config.autosave.enabled {
            session.set_autosave(Some(AutosaveOptions::from_config(&config.autosave)));
        }
        Ok(session)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn document(&self) -> &EditorDocument {
        self.store.document()
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to simulate gestures or mount it.
    ///
    /// Changes made here are not seen until the next reconcile.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    /// Turns autosave on or off, or points it at another location.
    ///
    /// The current document counts as saved; only later changes are written.
    pub fn set_autosave(&mut self, options: Option<AutosaveOptions>) {
        if let Some(options) = &options {
            debug!("Autosaving to {}", options.document_path().display());
        }
        self.autosave = options;
        self.saved_revision = self.store.document_revision();
    }

    pub fn autosave_options(&self) -> Option<&AutosaveOptions> {
        self.autosave.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn active_view(&self) -> ActiveView {
        ActiveView {
            page: self.page,
            scale: self.scale,
        }
    }

    /// Changes the displayed page and zoom.
    ///
    /// The page size reported by the renderer is written to the document as
    /// `pageWidth/pageHeight = viewport / scale` and the surface is resized.
    pub fn set_view(&mut self, page: u32, scale: f64) -> Result<ReconcileReport, SessionError> {
        if !is_valid_scale(scale) {
            return Err(SessionError::InvalidScale(scale));
        }
        let page_count = self.effective_page_count();
        if page == 0 || page > page_count {
            return Err(SessionError::PageOutOfRange { page, page_count });
        }

        let limits = &self.view_limits;
        let clamped = scale.clamp(limits.min_scale, limits.max_scale);
        if clamped != scale {
            warn!(
                "Scale {scale} outside {}-{}; using {clamped}",
                limits.min_scale, limits.max_scale
            );
        }

        debug!("View -> page {page} at scale {clamped}");
        self.page = page;
        self.scale = clamped;
        self.apply_viewport();
        let report = self.reconcile();
        self.persist();
        Ok(report)
    }

    /// Convenience for zoom-only changes.
    pub fn set_scale(&mut self, scale: f64) -> Result<ReconcileReport, SessionError> {
        self.set_view(self.page, scale)
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.store.set_tool(tool);
        self.sync();
    }

    /// Records the asset the next Image/Sign placement will use.
    pub fn choose_asset(&mut self, asset: ChosenAsset) {
        self.router.choose_asset(asset);
    }

    pub fn add_overlay(&mut self, overlay: Overlay) -> Result<ReconcileReport, SessionError> {
        self.store.add_overlay(overlay)?;
        Ok(self.sync())
    }

    pub fn update_overlay(
        &mut self,
        id: &OverlayId,
        patch: &OverlayPatch,
    ) -> Result<ReconcileReport, SessionError> {
        self.store.update_overlay(id, patch)?;
        Ok(self.sync())
    }

    pub fn remove_overlay(&mut self, id: &OverlayId) -> bool {
        let removed = self.store.remove_overlay(id);
        self.sync();
        removed
    }

    pub fn select_overlay(&mut self, id: Option<OverlayId>) {
        self.store.select_overlay(id);
        self.sync();
    }

    pub fn set_doc_meta(&mut self, meta: DocMeta) {
        self.store.set_doc_meta(meta);
        self.sync();
    }

    /// Routes one native notification and reconciles.
    pub fn dispatch(&mut self, event: SceneEvent) -> Result<ReconcileReport, SessionError> {
        let view = self.active_view();
        let result = self
            .router
            .dispatch(event, view, &mut self.store, &self.surface);
        let report = self.sync();
        result?;
        Ok(report)
    }

    /// Applies finished asset loads. Returns how many nodes were inserted.
    pub fn pump_assets(&mut self) -> usize {
        let completions = self.loader.poll_completed();
        self.apply_completions(completions)
    }

    /// Applies completions collected outside [`AssetLoader::poll_completed`],
    /// e.g. by a blocking wait on the loader.
    pub fn apply_completions(&mut self, completions: Vec<AssetCompletion>) -> usize {
        if completions.is_empty() {
            return 0;
        }

        let pending_edit = self.router.pending_edit().cloned();
        let ctx = ReconcileContext::from_store(
            &self.store,
            self.page,
            self.scale,
            pending_edit.as_ref(),
        );
        let mut inserted = 0;
        for completion in completions {
            if let LoadOutcome::Inserted(_) =
                self.reconciler
                    .complete_load(completion, &ctx, &mut self.surface)
            {
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.reconcile();
        }
        inserted
    }

    /// Runs a reconciliation pass regardless of whether anything changed.
    pub fn reconcile(&mut self) -> ReconcileReport {
        self.router.forget_missing(&self.store);
        let pending_edit = self.router.pending_edit().cloned();
        let ctx = ReconcileContext::from_store(
            &self.store,
            self.page,
            self.scale,
            pending_edit.as_ref(),
        );
        let report = self
            .reconciler
            .reconcile(&ctx, &mut self.surface, &mut self.loader);

        self.synced_revision = if report.skipped {
            None
        } else {
            Some(self.store.revision())
        };
        report
    }

    /// Replaces the document, e.g. after opening a file or restoring an autosave.
    ///
    /// In-flight asset loads for the previous document are invalidated.
    /// Returns the number of overlays dropped for repeating an id.
    pub fn load_document(&mut self, mut doc: EditorDocument) -> usize {
        if doc.page_count == 0 {
            doc.page_count = self.renderer.page_count();
        }
        info!(
            "Loading document with {} overlays across {} pages",
            doc.overlays.len(),
            doc.page_count
        );

        self.reconciler.reset();
        self.router.reset();
        let dropped = self.store.replace_document(doc);
        if self.page > self.effective_page_count() {
            self.page = 1;
        }
        self.apply_viewport();
        self.reconcile();
        self.persist();
        dropped
    }

    /// Clears the document and editor state back to an empty session.
    pub fn reset(&mut self) {
        self.reconciler.reset();
        self.router.reset();
        self.store.reset();
        self.store.set_doc_meta(DocMeta {
            page_count: Some(self.renderer.page_count()),
            ..DocMeta::default()
        });
        self.page = 1;
        self.apply_viewport();
        self.reconcile();
        self.persist();
    }

    pub fn export_snapshot(&self) -> ExportSnapshot {
        self.store.export_snapshot()
    }

    /// Reconciles if the model or router state changed since the last pass,
    /// or if the last pass was skipped because the surface was not mounted.
    fn sync(&mut self) -> ReconcileReport {
        let router_dirty = self.router.take_needs_reconcile();
        let report = if router_dirty || self.synced_revision != Some(self.store.revision()) {
            self.reconcile()
        } else {
            ReconcileReport::default()
        };
        self.persist();
        report
    }

    /// Writes the document to the autosave file if it changed since the last write.
    fn persist(&mut self) {
        let Some(options) = &self.autosave else {
            return;
        };
        let revision = self.store.document_revision();
        if revision == self.saved_revision {
            return;
        }
        self.saved_revision = revision;
        if let Err(err) = autosave::save_document(self.store.document(), options) {
            warn!("Failed to autosave document: {err:#}");
        }
    }

    fn effective_page_count(&self) -> u32 {
        match self.store.document().page_count {
            0 => self.renderer.page_count(),
            count => count,
        }
    }

    fn apply_viewport(&mut self) {
        match self.renderer.viewport(self.page, self.scale) {
            Some(viewport) => {
                self.store.set_doc_meta(DocMeta::page_size(
                    viewport.width / self.scale,
                    viewport.height / self.scale,
                ));
                self.surface.resize(viewport.width, viewport.height);
            }
            None => debug!("Renderer has no viewport for page {}", self.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverlayKind, TextOverlay};
    use crate::scene::{ManualAssetLoader, MemoryScene};

    type TestSession = EditorSession<MemoryScene, ManualAssetLoader, FixedPageRenderer>;

    fn session() -> TestSession {
        let mut config = Config::default();
        config.model.strict_checks = Some(false);
        EditorSession::new(
            &config,
            MemoryScene::new(),
            ManualAssetLoader::new(),
            FixedPageRenderer::letter(3),
        )
        .unwrap()
    }

    #[test]
    fn new_session_sizes_page_and_surface() {
        let session = session();
        let doc = session.document();
        assert_eq!((doc.page_width, doc.page_height), (612.0, 792.0));
        assert_eq!(doc.page_count, 3);
        let (width, height) = session.surface().size();
        assert!((width - 612.0 * 1.2).abs() < 1e-9);
        assert!((height - 792.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn set_view_rejects_invalid_scale_and_page() {
        let mut session = session();
        assert!(matches!(
            session.set_view(1, 0.0),
            Err(SessionError::InvalidScale(_))
        ));
        assert!(matches!(
            session.set_view(1, f64::NAN),
            Err(SessionError::InvalidScale(_))
        ));
        assert!(matches!(
            session.set_view(4, 1.0),
            Err(SessionError::PageOutOfRange {
                page: 4,
                page_count: 3
            })
        ));
        assert_eq!(session.scale(), 1.2);
    }

    #[test]
    fn set_view_clamps_to_configured_limits() {
        let mut session = session();
        session.set_view(1, 100.0).unwrap();
        assert_eq!(session.scale(), 8.0);
    }

    #[test]
    fn model_errors_surface_as_session_errors() {
        let mut session = session();
        let overlay = Overlay::new("t", 1, OverlayKind::Text(TextOverlay::new("x")));
        session.add_overlay(overlay.clone()).unwrap();

        assert!(matches!(
            session.add_overlay(overlay),
            Err(SessionError::Model(_))
        ));
        assert_eq!(session.surface().len(), 1);
    }

    #[test]
    fn switching_pages_swaps_nodes() {
        let mut session = session();
        session
            .add_overlay(Overlay::new("p1", 1, OverlayKind::Text(TextOverlay::new("a"))))
            .unwrap();
        session
            .add_overlay(Overlay::new("p2", 2, OverlayKind::Text(TextOverlay::new("b"))))
            .unwrap();
        assert_eq!(session.surface().bound_ids(), vec![OverlayId::from("p1")]);

        session.set_view(2, 1.2).unwrap();
        assert_eq!(session.surface().bound_ids(), vec![OverlayId::from("p2")]);
    }

    #[test]
    fn autosave_follows_document_changes() {
        let temp = tempfile::tempdir().unwrap();
        let options = AutosaveOptions::new(temp.path().to_path_buf());
        let mut session = session();
        session.set_autosave(Some(options.clone()));

        session.set_tool(Tool::Shape);
        session.select_overlay(Some("t".into()));
        assert!(!options.document_path().exists());

        session
            .add_overlay(
                Overlay::new("t", 1, OverlayKind::Text(TextOverlay::new("x"))).at(80.0, 120.0),
            )
            .unwrap();
        let saved = autosave::load_document(&options).unwrap().expect("autosaved");
        assert_eq!(&saved, session.document());

        session.reset();
        let saved = autosave::load_document(&options).unwrap().expect("autosaved");
        assert!(saved.overlays.is_empty());
        assert_eq!(saved.page_count, 3);
    }

    #[test]
    fn autosave_follows_config_switch() {
        assert!(session().autosave_options().is_none());

        let mut config = Config::default();
        config.model.strict_checks = Some(false);
        config.autosave.enabled = true;
        config.autosave.file_name = "draft.json".into();
        let session = EditorSession::new(
            &config,
            MemoryScene::new(),
            ManualAssetLoader::new(),
            FixedPageRenderer::letter(1),
        )
        .unwrap();

        let options = session.autosave_options().expect("autosave enabled");
        assert_eq!(options.file_name, "draft.json");
    }

    #[test]
    fn autosave_failure_does_not_fail_the_edit() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let mut session = session();
        session.set_autosave(Some(AutosaveOptions::new(blocker)));

        session
            .add_overlay(Overlay::new("t", 1, OverlayKind::Text(TextOverlay::new("x"))))
            .unwrap();

        assert_eq!(session.document().overlays.len(), 1);
        assert_eq!(session.surface().len(), 1);
    }

    #[test]
    fn reset_clears_scene() {
        let mut session = session();
        session
            .add_overlay(Overlay::new("t", 1, OverlayKind::Text(TextOverlay::new("x"))))
            .unwrap();
        session.set_tool(Tool::Shape);

        session.reset();

        assert!(session.surface().is_empty());
        assert_eq!(session.store().tool(), Tool::Select);
        assert_eq!(session.document().page_count, 3);
        assert_eq!(session.document().page_width, 612.0);
    }
}
