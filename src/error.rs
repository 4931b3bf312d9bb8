//! Error types shared across the engine.

use crate::model::OverlayId;
use thiserror::Error;

/// Programmer errors against the overlay model.
///
/// These never corrupt the model: the offending mutation is rejected and the
/// model is left exactly as it was. In strict mode the store panics instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("overlay id {0} is already present in the document")]
    DuplicateId(OverlayId),

    #[error("no overlay with id {0}")]
    UnknownOverlay(OverlayId),

    #[error("field `{field}` does not belong to {kind} overlay {id}")]
    FieldMismatch {
        id: OverlayId,
        kind: &'static str,
        field: &'static str,
    },
}

/// Failure to fetch or decode an image/signature asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {reference}: {source}")]
    Io {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode asset {reference}: {message}")]
    Decode { reference: String, message: String },

    #[error("unsupported asset reference {0}")]
    Unsupported(String),

    #[error("overlay has no asset reference")]
    Empty,
}

/// Errors surfaced by [`crate::EditorSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid scale {0}; expected a finite value greater than zero")]
    InvalidScale(f64),

    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error(transparent)]
    Model(#[from] ModelError),
}
