use super::options::AutosaveOptions;
use crate::model::EditorDocument;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct AutosaveFile {
    version: u32,
    last_modified: String,
    document: EditorDocument,
}

/// Result of clearing on-disk autosave data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub removed_document: bool,
    pub removed_backup: bool,
    pub removed_lock: bool,
}

/// Persist the document under an exclusive lock.
///
/// The payload goes to a temporary file first and is renamed into place, so
/// a crash mid-write leaves the previous save intact.
pub fn save_document(document: &EditorDocument, options: &AutosaveOptions) -> Result<()> {
    fs::create_dir_all(&options.base_dir).with_context(|| {
        format!(
            "failed to create autosave directory {}",
            options.base_dir.display()
        )
    })?;

    let lock_path = options.lock_path();
    let lock_file = open_lock(&lock_path)?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("failed to lock autosave file {}", lock_path.display()))?;

    let result = save_document_inner(document, options);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock autosave file {}: {}",
            lock_path.display(),
            err
        )
    });

    result
}

fn save_document_inner(document: &EditorDocument, options: &AutosaveOptions) -> Result<()> {
    let document_path = options.document_path();
    let backup_path = options.backup_path();

    let payload = AutosaveFile {
        version: CURRENT_VERSION,
        last_modified: Utc::now().to_rfc3339(),
        document: document.clone(),
    };
    let json_bytes =
        serde_json::to_vec_pretty(&payload).context("failed to serialise autosave payload")?;

    if json_bytes.len() as u64 > options.max_file_size_bytes {
        warn!(
            "Autosave data size {} bytes exceeds the configured limit of {} bytes; skipping save",
            json_bytes.len(),
            options.max_file_size_bytes
        );
        return Ok(());
    }

    let tmp_path = temp_path(&document_path);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| {
                format!(
                    "failed to open temporary autosave file {}",
                    tmp_path.display()
                )
            })?;
        tmp_file
            .write_all(&json_bytes)
            .context("failed to write autosave payload")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary autosave file")?;
    }

    if document_path.exists() {
        if options.keep_backup {
            if backup_path.exists() {
                fs::remove_file(&backup_path).ok();
            }
            fs::rename(&document_path, &backup_path).with_context(|| {
                format!(
                    "failed to rotate previous autosave {} -> {}",
                    document_path.display(),
                    backup_path.display()
                )
            })?;
        } else {
            fs::remove_file(&document_path).ok();
        }
    }

    fs::rename(&tmp_path, &document_path).with_context(|| {
        format!(
            "failed to move temporary autosave file {} -> {}",
            tmp_path.display(),
            document_path.display()
        )
    })?;

    info!(
        "Document saved to {} ({} overlays, {} bytes)",
        document_path.display(),
        document.overlays.len(),
        json_bytes.len()
    );
    Ok(())
}

/// Attempt to load a previously saved document.
///
/// Returns `Ok(None)` when nothing was saved or the file exceeds the size
/// limit. Overlays with repeated ids are dropped on the way in.
pub fn load_document(options: &AutosaveOptions) -> Result<Option<EditorDocument>> {
    let document_path = options.document_path();
    if !document_path.exists() {
        debug!(
            "No autosave present at {}, skipping load",
            document_path.display()
        );
        return Ok(None);
    }

    let metadata = fs::metadata(&document_path)
        .with_context(|| format!("failed to stat autosave file {}", document_path.display()))?;
    if metadata.len() > options.max_file_size_bytes {
        warn!(
            "Autosave file {} is {} bytes which exceeds the configured limit ({} bytes); refusing to load",
            document_path.display(),
            metadata.len(),
            options.max_file_size_bytes
        );
        return Ok(None);
    }

    let lock_path = options.lock_path();
    let lock_file = open_lock(&lock_path)?;
    lock_file
        .lock_shared()
        .with_context(|| format!("failed to acquire shared lock {}", lock_path.display()))?;

    let result = load_document_inner(&document_path);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock autosave file {}: {}",
            lock_path.display(),
            err
        )
    });

    let mut document = result?;
    let dropped = document.dedupe_ids();
    if dropped > 0 {
        warn!(
            "Autosave {} contained {} overlays with repeated ids",
            document_path.display(),
            dropped
        );
    }
    Ok(Some(document))
}

fn load_document_inner(document_path: &Path) -> Result<EditorDocument> {
    let mut bytes = Vec::new();
    {
        let mut file = File::open(document_path)
            .with_context(|| format!("failed to open autosave file {}", document_path.display()))?;
        file.read_to_end(&mut bytes)
            .context("failed to read autosave file")?;
    }

    let file: AutosaveFile =
        serde_json::from_slice(&bytes).context("failed to parse autosave json")?;
    if file.version > CURRENT_VERSION {
        bail!(
            "autosave file {} has version {} but only version {} is supported",
            document_path.display(),
            file.version,
            CURRENT_VERSION
        );
    }
    debug!(
        "Loaded autosave from {} (last modified {})",
        document_path.display(),
        file.last_modified
    );
    Ok(file.document)
}

/// Remove the autosave file, its backup and its lock file.
pub fn clear_autosave(options: &AutosaveOptions) -> Result<ClearOutcome> {
    Ok(ClearOutcome {
        removed_document: remove_file_if_exists(&options.document_path())?,
        removed_backup: remove_file_if_exists(&options.backup_path())?,
        removed_lock: remove_file_if_exists(&options.lock_path())?,
    })
}

fn open_lock(lock_path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("failed to open autosave lock file {}", lock_path.display()))
}

fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut candidate = target.with_extension("json.tmp");
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_extension(format!("json.tmp{}", counter));
    }
    candidate
}
