//! The public Security Gateway surface (spec §4.1): `execute_cli` and
//! `execute_script`, wiring the allow-list lookup, validate-and-build,
//! script path confinement, and subprocess execution together. Stateless
//! across invocations — the only state is the loaded config and the list
//! of approved script roots, both set once at construction.

use std::collections::BTreeMap;
use std::path::PathBuf;

use skills_config::ToolConfigFile;

use crate::error::GatewayError;
use crate::exec::{CommandRunner, ExecOutcome, SubprocessRunner};
use crate::script;
use crate::validate::validate_and_build;

/// Script calls get a longer default timeout than CLI calls (spec §5:
/// "CLI: 10-60s typical; scripts: 120s").
pub const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 120;

pub struct SecurityGateway {
    config: ToolConfigFile,
    script_roots: Vec<PathBuf>,
    project_root: PathBuf,
    runner: Box<dyn CommandRunner>,
}

/// Outcome of a gateway invocation as handed back to the caller: either a
/// tagged failure string (never a raised exception, per §4.1 failure
/// semantics) or the subprocess's captured output.
#[derive(Debug, Clone)]
pub struct GatewayResult {
    pub output: String,
    pub exit_code: i32,
    pub blocked: bool,
}

impl SecurityGateway {
    pub fn new(config: ToolConfigFile, script_roots: Vec<PathBuf>, project_root: PathBuf) -> Self {
        Self {
            config,
            script_roots,
            project_root,
            runner: Box::new(SubprocessRunner),
        }
    }

    /// Construct with an injected [`CommandRunner`], e.g.
    /// [`crate::exec::testing::NullCommandRunner`] to assert that a blocked
    /// request never reaches a real subprocess (spec §8 scenario 3).
    pub fn with_runner(
        config: ToolConfigFile,
        script_roots: Vec<PathBuf>,
        project_root: PathBuf,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            script_roots,
            project_root,
            runner,
        }
    }

    /// `execute_cli(tool_name, params) -> (stdout, exit_code, truncated?)`
    /// (spec §4.1). Returns `Ok` with a `[SECURITY BLOCKED]`/`[ERROR]`
    /// tagged string on validation or execution failure — never `Err` —
    /// because the generation model must read and react to it inline.
    pub fn execute_cli(&self, tool_name: &str, params: &BTreeMap<String, String>) -> GatewayResult {
        let built = match validate_and_build(&self.config, tool_name, params) {
            Ok(built) => built,
            Err(err) => return tagged_failure(&err),
        };

        let outcome = self
            .runner
            .run(&built.command, built.timeout_secs, &self.project_root, &BTreeMap::new());

        self.finish(outcome, built.timeout_secs, &built.command)
    }

    /// `execute_script(script_name, args, env_overrides) -> (stdout,
    /// exit_code)` (spec §4.1).
    pub fn execute_script(
        &self,
        script_name: &str,
        args: &[String],
        env_overrides: &BTreeMap<String, String>,
    ) -> GatewayResult {
        let resolved = match script::resolve_script_path(&self.script_roots, script_name) {
            Ok(path) => path,
            Err(err) => return tagged_failure(&err),
        };

        if let Err(err) = script::validate_args(args) {
            return tagged_failure(&err);
        }
        if let Err(err) = script::validate_env(env_overrides) {
            return tagged_failure(&err);
        }

        let quoted_args: Vec<String> = args.iter().map(|a| crate::quoting::quote_slot(a)).collect();
        let command = format!(
            "python3 {} {}",
            crate::quoting::quote_slot(&resolved.to_string_lossy()),
            quoted_args.join(" ")
        );

        if let Err(err) =
            crate::validate::check_blocked_patterns(&self.config.blocked_patterns, &command)
        {
            return tagged_failure(&err);
        }

        let outcome = self.runner.run(
            &command,
            DEFAULT_SCRIPT_TIMEOUT_SECS,
            &self.project_root,
            env_overrides,
        );

        self.finish(outcome, DEFAULT_SCRIPT_TIMEOUT_SECS, &command)
    }

    fn finish(&self, outcome: ExecOutcome, timeout_secs: u64, command: &str) -> GatewayResult {
        if outcome.timed_out {
            return tagged_failure(&GatewayError::Timeout {
                command: command.to_string(),
                timeout_secs,
            });
        }
        if outcome.exit_code != 0 {
            let tagged = GatewayError::NonZeroExit {
                exit_code: outcome.exit_code,
                output: outcome.stdout.clone(),
            }
            .to_tagged_string();
            let combined = format!("{}\n[EXIT_CODE] {}\n{tagged}", outcome.stdout, outcome.exit_code);
            return GatewayResult {
                output: combined,
                exit_code: outcome.exit_code,
                blocked: false,
            };
        }
        GatewayResult {
            output: outcome.stdout,
            exit_code: 0,
            blocked: false,
        }
    }

    pub fn describe_catalog(&self) -> String {
        self.config.describe_catalog()
    }
}

fn tagged_failure(err: &GatewayError) -> GatewayResult {
    GatewayResult {
        output: err.to_tagged_string(),
        exit_code: -1,
        blocked: true,
    }
}
