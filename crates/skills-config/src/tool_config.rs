//! The declarative allow-list (spec §4.1, §6): a YAML file mapping tool
//! names to command templates, per-slot regexes, a timeout, and a one-line
//! description, plus a global list of blocked-pattern regexes scanned
//! against the assembled command as a final defence.
//!
//! Parse failures are fatal at start-up (spec §9: "internal failures inside
//! the gateway... should be fatal at start-up") — this module never returns
//! a tagged string, only a hard error for the caller to surface and exit on.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliToolSpec {
    pub template: String,
    pub params: BTreeMap<String, String>,
    pub timeout: u64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolConfigFile {
    #[serde(default)]
    pub cli_whitelist: BTreeMap<String, CliToolSpec>,
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
}

impl ToolConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read tool config at {}", path.display()))?;
        let config: ToolConfigFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse tool config at {}", path.display()))?;
        Ok(config)
    }

    pub fn tool(&self, name: &str) -> Option<&CliToolSpec> {
        self.cli_whitelist.get(name)
    }

    /// A human-readable catalog the Planner feeds to the skill parser
    /// ("the Security Gateway's allow-list description", spec §4.3 inputs).
    pub fn describe_catalog(&self) -> String {
        let mut lines: Vec<String> = self
            .cli_whitelist
            .iter()
            .map(|(name, spec)| format!("- {name}: {}", spec.description))
            .collect();
        lines.sort();
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_yaml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_cli_whitelist_and_blocked_patterns() {
        let yaml = r#"
cli_whitelist:
  read_file:
    template: "type {path}"
    params:
      path: "^[A-Za-z0-9_./\\\\-]+$"
    timeout: 10
    description: "Read a text file"
blocked_patterns:
  - ";"
  - "\\|"
"#;
        let file = write_temp_yaml(yaml);
        let config = ToolConfigFile::load(file.path()).unwrap();
        assert!(config.tool("read_file").is_some());
        assert_eq!(config.blocked_patterns.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = ToolConfigFile::load(Path::new("/nonexistent/tools_config.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn describe_catalog_is_sorted_and_readable() {
        let mut whitelist = BTreeMap::new();
        whitelist.insert(
            "zzz_tool".to_string(),
            CliToolSpec {
                template: "echo {x}".into(),
                params: BTreeMap::new(),
                timeout: 5,
                description: "last alphabetically".into(),
            },
        );
        whitelist.insert(
            "aaa_tool".to_string(),
            CliToolSpec {
                template: "echo {x}".into(),
                params: BTreeMap::new(),
                timeout: 5,
                description: "first alphabetically".into(),
            },
        );
        let config = ToolConfigFile {
            cli_whitelist: whitelist,
            blocked_patterns: vec![],
        };
        let catalog = config.describe_catalog();
        let aaa_pos = catalog.find("aaa_tool").unwrap();
        let zzz_pos = catalog.find("zzz_tool").unwrap();
        assert!(aaa_pos < zzz_pos);
    }
}
