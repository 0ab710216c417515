//! L1 — Global Context (spec §4.2): process-wide, read-only after initial
//! load, resolved from a well-known project-root file and cached behind a
//! `OnceLock` so repeated steps never re-read the file.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

static CACHE: OnceLock<String> = OnceLock::new();

/// `load_global_context() -> string` (spec §4.2). Idempotent: the well-known
/// file (`AGENT.md` by default) is read once per process and cached. A
/// missing file is not an error — it simply yields an empty global context,
/// since L1 content is optional scaffolding, not a required input.
pub fn load_global_context(path: &Path) -> &'static str {
    CACHE.get_or_init(|| fs::read_to_string(path).unwrap_or_default())
}

/// Test-only escape hatch: production code never needs to observe the
/// cache directly, but unit tests that exercise a fresh process-wide
/// cache state would otherwise interfere with one another.
#[cfg(test)]
pub(crate) fn load_global_context_uncached(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}
