//! Library exports for the pagemark overlay engine.
//!
//! Keeps an editable overlay model (text, images, shapes, annotations, form
//! fields, signatures placed on document pages) synchronized with a retained
//! mode scene graph. The scene graph, the page renderer and the asset fetcher
//! are external collaborators expressed as traits so hosts can plug in their
//! own rendering surface.

pub mod autosave;
pub mod config;
pub mod coords;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod scene;
pub mod store;

pub use config::Config;
pub use engine::{EditorSession, FixedPageRenderer, PageRenderer, Viewport};
pub use error::{AssetError, ModelError, SessionError};
pub use input::{InputRouter, SceneEvent, Tool};
pub use model::{EditorDocument, ExportSnapshot, Overlay, OverlayId, OverlayKind, OverlayPatch};
pub use scene::{MemoryScene, ReconcileReport, Reconciler, SceneSurface};
pub use store::DocumentStore;
