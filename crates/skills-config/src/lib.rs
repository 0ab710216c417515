//! Configuration loading: the YAML-shaped tool allow-list consumed by the
//! Security Gateway, and a small TOML run-config carrying the retry/anchor/
//! threshold knobs and model endpoint settings. Both follow the teacher's
//! `ProjectConfig`-style load/save idiom, not a bespoke format.

pub mod paths;
pub mod run_config;
pub mod tool_config;

pub use run_config::RunConfig;
pub use tool_config::{CliToolSpec, ToolConfigFile};
