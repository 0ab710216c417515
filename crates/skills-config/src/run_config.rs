//! The run-config TOML file: retry/anchor/threshold knobs and model
//! endpoint settings, loaded and saved the way the teacher's
//! `ProjectConfig::load`/`save` handles `.csa/config.toml` — atomic
//! write-via-tempfile-then-rename, `Ok(None)` on a missing file rather than
//! an error.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skills_core::{ANCHOR_EVERY_N_TOOL_CALLS, EVALUATOR_MAX_TOOL_ROUNDS, STUCK_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_stuck_threshold")]
    pub stuck_threshold: u32,
    #[serde(default = "default_anchor_every_n_tool_calls")]
    pub anchor_every_n_tool_calls: u32,
    #[serde(default = "default_evaluator_max_tool_rounds")]
    pub evaluator_max_tool_rounds: u32,
    #[serde(default)]
    pub model_name: Option<String>,
}

fn default_max_retries() -> u32 {
    2
}
fn default_stuck_threshold() -> u32 {
    STUCK_THRESHOLD
}
fn default_anchor_every_n_tool_calls() -> u32 {
    ANCHOR_EVERY_N_TOOL_CALLS
}
fn default_evaluator_max_tool_rounds() -> u32 {
    EVALUATOR_MAX_TOOL_ROUNDS
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            stuck_threshold: default_stuck_threshold(),
            anchor_every_n_tool_calls: default_anchor_every_n_tool_calls(),
            evaluator_max_tool_rounds: default_evaluator_max_tool_rounds(),
            model_name: None,
        }
    }
}

impl RunConfig {
    /// Returns `Ok(None)` if `path` does not exist, mirroring the teacher's
    /// "config is optional, defaults apply" contract.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read run config at {}", path.display()))?;
        let config: RunConfig = toml::from_str(&raw)
            .with_context(|| format!("failed to parse run config at {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn load_or_default(path: &Path) -> Result<Self> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize run config")?;
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, contents)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename into {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_nonexistent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(RunConfig::load(&path).unwrap().is_none());
    }

    #[test]
    fn load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = RunConfig::load_or_default(&path).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = RunConfig::default();
        config.max_retries = 5;
        config.model_name = Some("gpt-4.1".to_string());
        config.save(&path).unwrap();

        let loaded = RunConfig::load(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn defaults_match_core_constants() {
        let config = RunConfig::default();
        assert_eq!(config.stuck_threshold, STUCK_THRESHOLD);
        assert_eq!(config.anchor_every_n_tool_calls, ANCHOR_EVERY_N_TOOL_CALLS);
        assert_eq!(
            config.evaluator_max_tool_rounds,
            EVALUATOR_MAX_TOOL_ROUNDS
        );
    }
}
