//! Routes a single [`ToolRequest`] through the Security Gateway (spec
//! §4.4 TOOL node). Shared between the Optimizer's tool loop and the
//! Evaluator's Phase 1 read-only inspection loop — both hand the gateway
//! the exact request the model produced and get back a tagged string on
//! failure, never a raised exception (spec §4.1 failure semantics).

use skills_core::ToolRequest;
use skills_gateway::SecurityGateway;

pub fn run_tool_request(gateway: &SecurityGateway, request: &ToolRequest) -> String {
    match request {
        ToolRequest::Cli { tool_name, params } => gateway.execute_cli(tool_name, params).output,
        ToolRequest::Script {
            script_name,
            args,
            env,
        } => gateway.execute_script(script_name, args, env).output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skills_config::{CliToolSpec, ToolConfigFile};
    use std::collections::BTreeMap;

    fn config() -> ToolConfigFile {
        let mut params = BTreeMap::new();
        params.insert("path".to_string(), r"^[A-Za-z0-9_./\\-]+$".to_string());
        let mut whitelist = BTreeMap::new();
        whitelist.insert(
            "read_file".to_string(),
            CliToolSpec {
                template: "cat {path}".to_string(),
                params,
                timeout: 10,
                description: "read a text file".to_string(),
            },
        );
        ToolConfigFile {
            cli_whitelist: whitelist,
            blocked_patterns: vec![";".to_string()],
        }
    }

    #[test]
    fn cli_request_runs_through_the_gateway() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out.txt"), "ok").unwrap();
        let gateway = SecurityGateway::new(config(), vec![], dir.path().to_path_buf());

        let mut params = BTreeMap::new();
        params.insert("path".to_string(), "out.txt".to_string());
        let request = ToolRequest::Cli {
            tool_name: "read_file".to_string(),
            params,
        };

        let output = run_tool_request(&gateway, &request);
        assert!(output.contains("ok"));
    }

    #[test]
    fn unknown_tool_returns_a_tagged_string_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = SecurityGateway::new(config(), vec![], dir.path().to_path_buf());
        let request = ToolRequest::Cli {
            tool_name: "curl".to_string(),
            params: BTreeMap::new(),
        };
        let output = run_tool_request(&gateway, &request);
        assert!(output.starts_with("[SECURITY BLOCKED]"));
    }
}
