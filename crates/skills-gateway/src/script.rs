//! `execute_script` validation (spec §4.1): `script_name` must resolve
//! under one of the approved root directories, the suffix must match the
//! host's scripting suffix, args must match a restricted alphabet, and env
//! keys/values must match their own restricted alphabets.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::GatewayError;

/// Required suffix for a script resolved by `execute_script`.
pub const SCRIPT_SUFFIX: &str = ".py";

fn arg_alphabet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_./:=,-]*$").expect("static regex is valid"))
}

fn env_key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("static regex is valid"))
}

fn env_value_alphabet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_./:=,@-]*$").expect("static regex is valid"))
}

/// Resolve `script_name` against `roots`, requiring the result to stay
/// under one of them (`PATH_ESCAPE` on traversal) and to exist on disk
/// (`SCRIPT_MISSING`).
pub fn resolve_script_path(roots: &[PathBuf], script_name: &str) -> Result<PathBuf, GatewayError> {
    if !script_name.ends_with(SCRIPT_SUFFIX) {
        return Err(GatewayError::SuffixForbidden(script_name.to_string()));
    }

    for root in roots {
        let candidate = root.join(script_name);
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.clone());
        match candidate.canonicalize() {
            Ok(canonical_candidate) if canonical_candidate.starts_with(&canonical_root) => {
                return Ok(canonical_candidate);
            }
            Ok(_) => continue,
            Err(_) => {
                // File doesn't exist yet; still reject if the lexical path
                // would escape the root once `..` segments are resolved.
                if path_escapes_root(root, &candidate) {
                    continue;
                }
                return Err(GatewayError::ScriptMissing(script_name.to_string()));
            }
        }
    }

    Err(GatewayError::PathEscape(script_name.to_string()))
}

fn path_escapes_root(root: &Path, candidate: &Path) -> bool {
    let mut depth: i64 = 0;
    for component in candidate.strip_prefix(root).unwrap_or(candidate).components() {
        use std::path::Component;
        match component {
            Component::ParentDir => depth -= 1,
            Component::Normal(_) => depth += 1,
            _ => {}
        }
        if depth < 0 {
            return true;
        }
    }
    false
}

pub fn validate_args(args: &[String]) -> Result<(), GatewayError> {
    for arg in args {
        if !arg_alphabet().is_match(arg) {
            return Err(GatewayError::ArgRejected(arg.clone()));
        }
    }
    Ok(())
}

pub fn validate_env(env: &BTreeMap<String, String>) -> Result<(), GatewayError> {
    for (key, value) in env {
        if !env_key_pattern().is_match(key) {
            return Err(GatewayError::EnvRejected(key.clone()));
        }
        if !env_value_alphabet().is_match(value) {
            return Err(GatewayError::EnvRejected(value.clone()));
        }
    }
    Ok(())
}
