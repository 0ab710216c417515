//! Builds the function-calling `ToolSpec` catalog the Optimizer/Evaluator
//! see, from the Security Gateway's declarative allow-list. The wire shape
//! mirrors [`skills_core::ToolRequest`] (`{kind, tool_name, params}` for
//! CLI tools; `{kind, script_name, args, env}` for scripts) so the
//! adapter's response parser can deserialize a tool call's arguments
//! straight into `ToolRequest`.

use serde_json::json;
use skills_adapters::ToolSpec;
use skills_config::ToolConfigFile;

pub fn build_cli_tool_specs(config: &ToolConfigFile) -> Vec<ToolSpec> {
    let mut specs: Vec<ToolSpec> = config
        .cli_whitelist
        .iter()
        .map(|(name, spec)| {
            let properties: serde_json::Map<String, serde_json::Value> = spec
                .params
                .keys()
                .map(|slot| (slot.clone(), json!({ "type": "string" })))
                .collect();
            let required: Vec<&String> = spec.params.keys().collect();

            ToolSpec {
                name: name.clone(),
                description: spec.description.clone(),
                parameters: json!({
                    "type": "object",
                    "required": ["kind", "tool_name", "params"],
                    "properties": {
                        "kind": { "const": "cli" },
                        "tool_name": { "const": name },
                        "params": {
                            "type": "object",
                            "properties": properties,
                            "required": required,
                        }
                    }
                }),
            }
        })
        .collect();
    specs.sort_by(|a, b| a.name.cmp(&b.name));
    specs
}

pub fn script_tool_spec() -> ToolSpec {
    ToolSpec {
        name: "execute_script".to_string(),
        description: "Run an approved .py script with restricted args/env".to_string(),
        parameters: json!({
            "type": "object",
            "required": ["kind", "script_name", "args", "env"],
            "properties": {
                "kind": { "const": "script" },
                "script_name": { "type": "string" },
                "args": { "type": "array", "items": { "type": "string" } },
                "env": { "type": "object", "additionalProperties": { "type": "string" } }
            }
        }),
    }
}
