//! Well-known path resolution, grounded on the teacher's XDG-aware
//! `directories::ProjectDirs` usage (`csa-config::paths`), simplified down
//! to the handful of paths this crate actually needs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const APP_NAME: &str = "skill-agent";

/// `config/tools_config.yaml` relative to the project root (spec §6).
pub fn default_tool_config_path(project_root: &Path) -> PathBuf {
    project_root.join("config").join("tools_config.yaml")
}

/// `.skill-agent/config.toml` relative to the project root.
pub fn default_run_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".skill-agent").join("config.toml")
}

/// `AGENT.md` relative to the project root — the well-known L1 global
/// context file.
pub fn default_global_context_path(project_root: &Path) -> PathBuf {
    project_root.join("AGENT.md")
}

/// Directories approved as roots for `execute_script` path resolution:
/// `<project_root>/scripts`.
pub fn default_scripts_dir(project_root: &Path) -> PathBuf {
    project_root.join("scripts")
}

/// Per-user durable state directory (L4 checkpoints live under here,
/// keyed by thread id). Falls back to `data_local_dir()` on platforms
/// without a dedicated state dir, exactly as the teacher's `get_session_root`
/// does for macOS/Windows.
pub fn state_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", APP_NAME)
        .context("failed to determine platform state directory")?;
    let dir = dirs
        .state_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs.data_local_dir().to_path_buf());
    Ok(dir)
}
