//! The validate-and-build algorithm (spec §4.1), in the exact order the
//! spec mandates: lookup, per-slot regex validation, path-separator
//! normalization, per-slot quoting, template interpolation, blocked-pattern
//! scan on the assembled command.

use std::collections::BTreeMap;

use regex::Regex;
use skills_config::ToolConfigFile;
use skills_core::normalize_path_separators;

use crate::error::GatewayError;
use crate::quoting::quote_slot;

fn full_match_regex(pattern: &str) -> Result<Regex, GatewayError> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|_| GatewayError::ParamSchemaViolation { slot: pattern.to_string() })
}

/// A slot's regex "admits path separators" if its pattern source mentions
/// either separator character — the safety net for operator-visible path
/// format drift (spec §4.1 step 3).
fn admits_path_separators(pattern: &str) -> bool {
    pattern.contains('/') || pattern.contains('\\')
}

pub struct BuiltCommand {
    pub command: String,
    pub timeout_secs: u64,
}

/// Validate `params` against the declared allow-list entry for `tool_name`
/// and build the final shell command string, or fail with the first
/// violated rule.
pub fn validate_and_build(
    config: &ToolConfigFile,
    tool_name: &str,
    params: &BTreeMap<String, String>,
) -> Result<BuiltCommand, GatewayError> {
    let spec = config
        .tool(tool_name)
        .ok_or_else(|| GatewayError::UnknownTool(tool_name.to_string()))?;

    let mut quoted: BTreeMap<String, String> = BTreeMap::new();
    for (slot, pattern) in &spec.params {
        let raw_value = params
            .get(slot)
            .ok_or_else(|| GatewayError::ParamSchemaViolation { slot: slot.clone() })?;

        let regex = full_match_regex(pattern)?;
        if !regex.is_match(raw_value) {
            return Err(GatewayError::ParamSchemaViolation { slot: slot.clone() });
        }

        let value = if admits_path_separators(pattern) {
            normalize_path_separators(raw_value)
        } else {
            raw_value.clone()
        };

        quoted.insert(slot.clone(), quote_slot(&value));
    }

    let command = interpolate_template(&spec.template, &quoted);

    check_blocked_patterns(&config.blocked_patterns, &command)?;

    Ok(BuiltCommand {
        command,
        timeout_secs: spec.timeout,
    })
}

fn interpolate_template(template: &str, quoted: &BTreeMap<String, String>) -> String {
    let mut result = template.to_string();
    for (slot, value) in quoted {
        result = result.replace(&format!("{{{slot}}}"), value);
    }
    result
}

pub fn check_blocked_patterns(patterns: &[String], command: &str) -> Result<(), GatewayError> {
    // Patterns are per-config, not static across the process, so compile
    // fresh each call; the allow-list is small and this runs once per tool
    // invocation, not in a hot loop.
    for pattern in patterns {
        let regex = Regex::new(pattern).map_err(|_| GatewayError::BlockedPatternMatch {
            pattern: pattern.clone(),
        })?;
        if regex.is_match(command) {
            return Err(GatewayError::BlockedPatternMatch {
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}
