//! The Plan JSON schema handed to the structured-output endpoint, and the
//! post-processing pass (spec §4.3): path-token host-native normalization,
//! shared with the Security Gateway's step 3 so P7 holds regardless of
//! which side runs first.

use serde_json::json;
use skills_core::{normalize_path_separators, Plan};

pub fn plan_structured_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["goal", "steps"],
        "properties": {
            "goal": { "type": "string" },
            "steps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["index", "optimizer_instruction", "evaluator_instruction"],
                    "properties": {
                        "index": { "type": "integer", "minimum": 0 },
                        "optimizer_instruction": { "type": "string" },
                        "evaluator_instruction": { "type": "string" },
                        "tools_hint": { "type": "array", "items": { "type": "string" } },
                        "depends_on": { "type": "array", "items": { "type": "integer" } }
                    }
                }
            }
        }
    })
}

/// Normalize every whitespace-delimited token containing a path separator
/// inside `text` to the host-native separator, leaving everything else
/// untouched (spec §4.3 post-processing).
pub fn normalize_path_tokens(text: &str) -> String {
    text.split(' ')
        .map(|token| {
            if token.contains('/') || token.contains('\\') {
                normalize_path_separators(token)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_plan_paths(mut plan: Plan) -> Plan {
    for step in &mut plan.steps {
        step.optimizer_instruction = normalize_path_tokens(&step.optimizer_instruction);
        step.evaluator_instruction = normalize_path_tokens(&step.evaluator_instruction);
    }
    plan
}
