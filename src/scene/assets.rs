//! Asynchronous asset loading for image and signature overlays.
//!
//! Loads are fire-and-forget: the reconciler issues an [`AssetRequest`] and
//! later receives an [`AssetCompletion`] through [`AssetLoader::poll_completed`].
//! There is no cancellation; stale completions are detected and discarded by
//! the reconciler.

use crate::error::AssetError;
use crate::model::OverlayId;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};
use std::io::{self, Cursor};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A request to fetch and measure one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    /// Ties the completion back to the placeholder that issued it
    pub ticket: u64,
    pub overlay_id: OverlayId,
    /// File path, `file://` URL or `data:` URL
    pub reference: String,
}

/// Decoded asset metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedAsset {
    pub natural_width: u32,
    pub natural_height: u32,
}

#[derive(Debug)]
pub struct AssetCompletion {
    pub ticket: u64,
    pub overlay_id: OverlayId,
    pub reference: String,
    pub result: Result<LoadedAsset, AssetError>,
}

impl AssetCompletion {
    pub fn for_request(request: &AssetRequest, result: Result<LoadedAsset, AssetError>) -> Self {
        Self {
            ticket: request.ticket,
            overlay_id: request.overlay_id.clone(),
            reference: request.reference.clone(),
            result,
        }
    }
}

/// Source of asset loads used by the reconciler.
pub trait AssetLoader {
    /// Starts a load. Must not block.
    fn request(&mut self, request: AssetRequest);

    /// Drains loads that finished since the last call.
    fn poll_completed(&mut self) -> Vec<AssetCompletion>;

    /// Number of requests issued but not yet returned from `poll_completed`.
    fn in_flight(&self) -> usize;
}

/// Reads an asset reference and measures the image it contains.
pub fn load_asset(reference: &str) -> Result<LoadedAsset, AssetError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(AssetError::Empty);
    }

    let bytes = if let Some(rest) = reference.strip_prefix("data:") {
        decode_data_url(reference, rest)?
    } else if reference.starts_with("http://") || reference.starts_with("https://") {
        return Err(AssetError::Unsupported(reference.to_string()));
    } else {
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        std::fs::read(path).map_err(|source| AssetError::Io {
            reference: reference.to_string(),
            source,
        })?
    };

    measure(reference, bytes)
}

fn decode_data_url(reference: &str, rest: &str) -> Result<Vec<u8>, AssetError> {
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(AssetError::Decode {
            reference: abbreviate(reference),
            message: "data URL has no payload".to_string(),
        });
    };
    if !header.ends_with(";base64") {
        return Err(AssetError::Unsupported(abbreviate(reference)));
    }

    STANDARD
        .decode(payload.trim())
        .map_err(|err| AssetError::Decode {
            reference: abbreviate(reference),
            message: err.to_string(),
        })
}

fn measure(reference: &str, bytes: Vec<u8>) -> Result<LoadedAsset, AssetError> {
    let decode_error = |message: String| AssetError::Decode {
        reference: abbreviate(reference),
        message,
    };

    let (natural_width, natural_height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| decode_error(err.to_string()))?
        .into_dimensions()
        .map_err(|err| decode_error(err.to_string()))?;

    if natural_width == 0 || natural_height == 0 {
        return Err(decode_error("image has zero size".to_string()));
    }

    Ok(LoadedAsset {
        natural_width,
        natural_height,
    })
}

/// Keeps inline payloads out of log lines and error messages.
fn abbreviate(reference: &str) -> String {
    const MAX: usize = 48;
    match reference.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &reference[..index]),
        None => reference.to_string(),
    }
}

/// Loader whose requests are resolved explicitly by the host.
///
/// Embedding hosts with their own fetch machinery record requests here and
/// call [`ManualAssetLoader::resolve`] when data arrives.
#[derive(Debug, Default)]
pub struct ManualAssetLoader {
    pending: Vec<AssetRequest>,
    ready: Vec<AssetCompletion>,
    issued: usize,
}

impl ManualAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet resolved, oldest first.
    pub fn pending(&self) -> &[AssetRequest] {
        &self.pending
    }

    /// Total number of requests ever issued.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Resolves the oldest pending request for `overlay_id`.
    ///
    /// Returns false when no such request is pending.
    pub fn resolve(
        &mut self,
        overlay_id: &OverlayId,
        result: Result<LoadedAsset, AssetError>,
    ) -> bool {
        let Some(index) = self
            .pending
            .iter()
            .position(|request| &request.overlay_id == overlay_id)
        else {
            return false;
        };

        let request = self.pending.remove(index);
        self.ready.push(AssetCompletion::for_request(&request, result));
        true
    }

    /// Resolves every pending request with `load`.
    pub fn resolve_all(
        &mut self,
        mut load: impl FnMut(&AssetRequest) -> Result<LoadedAsset, AssetError>,
    ) {
        for request in std::mem::take(&mut self.pending) {
            let result = load(&request);
            self.ready.push(AssetCompletion::for_request(&request, result));
        }
    }
}

impl AssetLoader for ManualAssetLoader {
    fn request(&mut self, request: AssetRequest) {
        debug!(
            "Queued asset request {} for overlay {}",
            request.ticket, request.overlay_id
        );
        self.issued += 1;
        self.pending.push(request);
    }

    fn poll_completed(&mut self) -> Vec<AssetCompletion> {
        std::mem::take(&mut self.ready)
    }

    fn in_flight(&self) -> usize {
        self.pending.len() + self.ready.len()
    }
}

/// Loader backed by one worker thread that reads files and `data:` URLs.
pub struct ThreadedAssetLoader {
    requests: Option<mpsc::Sender<AssetRequest>>,
    completions: mpsc::Receiver<AssetCompletion>,
    worker: Option<JoinHandle<()>>,
    /// Completions produced locally when the worker is gone
    failed: Vec<AssetCompletion>,
    in_flight: usize,
}

impl ThreadedAssetLoader {
    pub fn spawn() -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<AssetRequest>();
        let (completion_tx, completion_rx) = mpsc::channel::<AssetCompletion>();

        let worker = thread::Builder::new()
            .name("pagemark-assets".to_string())
            .spawn(move || {
                for request in request_rx {
                    let result = load_asset(&request.reference);
                    if let Err(err) = &result {
                        warn!("Asset load failed for overlay {}: {}", request.overlay_id, err);
                    }
                    if completion_tx
                        .send(AssetCompletion::for_request(&request, result))
                        .is_err()
                    {
                        debug!("Asset completion receiver dropped; stopping worker");
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            completions: completion_rx,
            worker: Some(worker),
            failed: Vec::new(),
            in_flight: 0,
        })
    }

    /// Blocks up to `timeout` for the first completion, then drains the rest.
    pub fn wait_completed(&mut self, timeout: Duration) -> Vec<AssetCompletion> {
        let mut done = std::mem::take(&mut self.failed);
        if done.is_empty() && self.in_flight > 0 {
            match self.completions.recv_timeout(timeout) {
                Ok(completion) => done.push(completion),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    debug!("Timed out waiting for {} asset loads", self.in_flight);
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("Asset worker exited with {} loads in flight", self.in_flight);
                }
            }
        }
        done.extend(self.completions.try_iter());
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }
}

impl AssetLoader for ThreadedAssetLoader {
    fn request(&mut self, request: AssetRequest) {
        let Some(sender) = &self.requests else {
            return;
        };
        self.in_flight += 1;
        if let Err(mpsc::SendError(request)) = sender.send(request) {
            let source = io::Error::other("asset worker is not running");
            self.failed.push(AssetCompletion {
                ticket: request.ticket,
                overlay_id: request.overlay_id,
                result: Err(AssetError::Io {
                    reference: abbreviate(&request.reference),
                    source,
                }),
                reference: request.reference,
            });
        }
    }

    fn poll_completed(&mut self) -> Vec<AssetCompletion> {
        self.wait_completed(Duration::ZERO)
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for ThreadedAssetLoader {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Asset worker thread panicked");
            }
        }
    }
}
