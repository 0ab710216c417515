//! L2 — Skill Memory (spec §4.2): append-only `key=value` lines, one per
//! plan execution, mutated only by COMMIT. These two free functions mirror
//! the spec's operation signatures exactly; [`skills_core::ExecutionState`]
//! owns the actual `Vec<String>` storage and calls through `commit`.

use std::collections::BTreeMap;

/// Human-readable placeholder substituted when skill memory is empty.
pub const EMPTY_MEMORY_PLACEHOLDER: &str = "(no prior outputs recorded for this run)";

/// `append_skill_memory(current, key_outputs) -> string` (spec §4.2).
/// Returns `current` unchanged if `key_outputs` is empty; insertion order
/// of the appended entries is irrelevant, so `key_outputs` is iterated in
/// key order via `BTreeMap` for deterministic output.
pub fn append_skill_memory(current: &[String], key_outputs: &BTreeMap<String, String>) -> Vec<String> {
    if key_outputs.is_empty() {
        return current.to_vec();
    }
    let mut appended = current.to_vec();
    for (key, value) in key_outputs {
        appended.push(format!("{key}={value}"));
    }
    appended
}

/// `format_skill_memory(s) -> string` (spec §4.2): substitutes a human
/// placeholder if `s` is empty, used when rendering the `<skill_memory>`
/// block at step PREPARE.
pub fn format_skill_memory(entries: &[String]) -> String {
    if entries.is_empty() {
        EMPTY_MEMORY_PLACEHOLDER.to_string()
    } else {
        entries.join("\n")
    }
}
