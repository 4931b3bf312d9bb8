use crate::config::AutosaveConfig;
use std::path::PathBuf;

const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Runtime options derived from configuration for document autosave.
#[derive(Debug, Clone)]
pub struct AutosaveOptions {
    pub base_dir: PathBuf,
    pub file_name: String,
    pub max_file_size_bytes: u64,
    pub keep_backup: bool,
}

impl AutosaveOptions {
    /// Creates options rooted at `base_dir` with default limits. Intended mainly for tests.
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            file_name: "autosave.json".to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            keep_backup: true,
        }
    }

    /// Builds options from the `[autosave]` section, storing files under the
    /// user data directory (falling back to the working directory).
    pub fn from_config(cfg: &AutosaveConfig) -> Self {
        let root = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let mut options = Self::new(root.join("pagemark"));
        options.file_name = cfg.file_name.clone();
        options.max_file_size_bytes = cfg.max_file_size_bytes.max(1);
        options.keep_backup = cfg.keep_backup;
        options
    }

    pub fn document_path(&self) -> PathBuf {
        self.base_dir.join(&self.file_name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.bak", self.file_name))
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(format!("{}.lock", self.file_name))
    }
}
