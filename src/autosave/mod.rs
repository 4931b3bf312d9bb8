//! Document autosave (save/restore) support.
//!
//! Writes the editor document to disk as versioned JSON with locking and
//! backup rotation, and restores it on startup when requested.

mod options;
mod storage;

pub use options::AutosaveOptions;
pub use storage::{ClearOutcome, clear_autosave, load_document, save_document};
