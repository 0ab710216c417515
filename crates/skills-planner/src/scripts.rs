//! Script discovery (spec §4.3 inputs): walk the approved script
//! directories and surface each `.py` file's first docstring line as its
//! description, feeding the Planner a live catalog alongside the Security
//! Gateway's CLI allow-list description. Grounded on the teacher's
//! `csa-todo::dag` markdown-walking idiom, adapted from TODO-checkbox
//! parsing to first-line-comment extraction.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub name: String,
    pub description: String,
}

/// Walk `roots` (non-recursively per root, as the gateway only resolves
/// one path segment deep under each approved root) collecting every
/// `.py` file's first docstring/comment line.
pub fn discover_scripts(roots: &[PathBuf]) -> Vec<ScriptDescriptor> {
    let mut found = Vec::new();
    for root in roots {
        let Ok(entries) = fs::read_dir(root) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("py") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let description = first_doc_line(&path).unwrap_or_default();
            found.push(ScriptDescriptor {
                name: name.to_string(),
                description,
            });
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

fn first_doc_line(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("\"\"\"") {
            let rest = rest.trim_end_matches("\"\"\"").trim();
            if !rest.is_empty() {
                return Some(rest.to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            return Some(rest.trim().to_string());
        }
        // First non-blank, non-docstring/comment line: no description found.
        return None;
    }
    None
}

pub fn describe_catalog(scripts: &[ScriptDescriptor]) -> String {
    scripts
        .iter()
        .map(|s| format!("- {}: {}", s.name, s.description))
        .collect::<Vec<_>>()
        .join("\n")
}
