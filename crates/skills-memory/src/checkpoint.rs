//! L4 — Checkpoint (spec §4.2, §6): durable, keyed by thread id, written
//! after each node transition, round-tripping the opaque `ExecutionState`.
//!
//! The distilled spec leaves L4 a contract only ("save after every node,
//! restore by thread id, survive process restart; no schema is mandated
//! beyond round-tripping"). This crate gives it a concrete implementation:
//! an atomic write-via-tempfile-then-rename JSON file per thread id,
//! following `csa-config::ProjectConfig::load`/`save`'s exact pattern
//! rather than the teacher's git-notes-based `csa-session::checkpoint`
//! mechanism — git-notes checkpointing is overkill for a single-thread-id
//! round-trip contract with no genealogy/session-sharing requirement (see
//! DESIGN.md).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use skills_core::ExecutionState;

/// `save(thread_id, state)`, `load(thread_id) -> state | none` (spec §4.6).
pub trait CheckpointStore: Send + Sync {
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()>;
    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>>;
}

/// Default [`CheckpointStore`]: one JSON file per thread id under
/// `base_dir`, written atomically.
pub struct FileCheckpointStore {
    base_dir: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn path_for(&self, thread_id: &str) -> PathBuf {
        self.base_dir.join(format!("{thread_id}.checkpoint.json"))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("failed to create checkpoint dir {}", self.base_dir.display()))?;

        let path = self.path_for(thread_id);
        let contents =
            serde_json::to_string_pretty(state).context("failed to serialize checkpoint state")?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, contents)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to rename into {}", path.display()))?;

        tracing::debug!(thread_id, path = %path.display(), "checkpoint written");
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>> {
        let path = self.path_for(thread_id);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read checkpoint {}", path.display()))?;
        let state: ExecutionState = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse checkpoint {}", path.display()))?;
        Ok(Some(state))
    }
}

/// Contract-only in-memory store, used by tests and dry runs that should
/// never touch disk.
pub struct InMemoryCheckpointStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, ExecutionState>>,
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self {
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn save(&self, thread_id: &str, state: &ExecutionState) -> Result<()> {
        self.entries
            .lock()
            .expect("checkpoint mutex poisoned")
            .insert(thread_id.to_string(), state.clone());
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<ExecutionState>> {
        Ok(self
            .entries
            .lock()
            .expect("checkpoint mutex poisoned")
            .get(thread_id)
            .cloned())
    }
}

pub fn default_checkpoint_dir(project_root: &Path) -> PathBuf {
    project_root.join(".skill-agent").join("checkpoints")
}
