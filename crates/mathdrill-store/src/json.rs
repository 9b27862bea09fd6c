//! History persisted as a single JSON file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use mathdrill_core::clock::{Clock, SystemClock};
use mathdrill_core::history::{append_and_prune, HistoryStore};
use mathdrill_core::model::TestResult;

use crate::paths::DataDir;

/// A [`HistoryStore`] backed by a pretty-printed JSON array on disk.
///
/// Every append rewrites the whole file. The new contents go to a sibling
/// temporary file first and are then renamed over the original.
pub struct JsonHistoryStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    /// Store at `history.json` inside `dir`, using the system clock.
    pub fn open(dir: &DataDir) -> Self {
        Self::new(dir.history_path(), Arc::new(SystemClock))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unparseable history file is moved before it is replaced.
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    /// Read the file. Missing reads as empty; unparseable reads as empty
    /// with a warning.
    fn load(&self) -> Result<Vec<TestResult>> {
        self.read().map(|(results, _)| results)
    }

    /// Like [`load`](Self::load), also reporting whether the file was corrupt.
    fn read(&self) -> Result<(Vec<TestResult>, bool)> {
        if !self.path.exists() {
            return Ok((Vec::new(), false));
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read history from {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok((Vec::new(), false));
        }
        match serde_json::from_str::<Vec<TestResult>>(&content) {
            Ok(results) => Ok((results, false)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "history file is corrupt, treating as empty: {e}"
                );
                Ok((Vec::new(), true))
            }
        }
    }

    /// Move a corrupt history file out of the way, keeping it for recovery.
    fn set_aside_corrupt(&self) -> Result<()> {
        let dest = self.corrupt_path();
        std::fs::rename(&self.path, &dest).with_context(|| {
            format!(
                "failed to move corrupt history {} to {}",
                self.path.display(),
                dest.display()
            )
        })?;
        tracing::warn!(path = %dest.display(), "kept corrupt history file");
        Ok(())
    }

    fn save(&self, results: &[TestResult]) -> Result<()> {
        let json = serde_json::to_string_pretty(results).context("failed to serialize history")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory {}", parent.display())
                })?;
            }
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write history to {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to move {} into place at {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl HistoryStore for JsonHistoryStore {
    fn append(&mut self, result: TestResult) -> Result<()> {
        let (mut results, corrupt) = self.read()?;
        let id = result.id.clone();
        if !append_and_prune(&mut results, result, self.clock.now()) {
            return Ok(());
        }
        if corrupt {
            self.set_aside_corrupt()?;
        }
        self.save(&results)?;
        tracing::debug!(%id, stored = results.len(), path = %self.path.display(), "history saved");
        Ok(())
    }

    fn all(&self) -> Result<Vec<TestResult>> {
        self.load()
    }
}
