use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;

use cli::{Cli, Commands};
use skills_adapters::{Adapters, FileSkillFileStore, HttpModelEndpoint, SystemClock};
use skills_config::{paths, RunConfig, ToolConfigFile};
use skills_gateway::SecurityGateway;
use skills_memory::{default_checkpoint_dir, CheckpointStore, FileCheckpointStore};
use skills_orchestrator::{Orchestrator, OrchestratorOutcome, StdioOperatorGate};
use skills_runner::{build_cli_tool_specs, script_tool_spec};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            skill,
            thread_id,
            cd,
        } => run_skill(skill, thread_id, cd).await?,
        Commands::ValidateConfig { cd } => validate_config(cd)?,
        Commands::ShowMemory { thread_id, cd } => show_memory(thread_id, cd)?,
    };

    std::process::exit(exit_code);
}

fn project_root(cd: Option<PathBuf>) -> Result<PathBuf> {
    match cd {
        Some(path) => Ok(path),
        None => std::env::current_dir().context("failed to determine current directory"),
    }
}

async fn run_skill(skill: PathBuf, thread_id: Option<String>, cd: Option<PathBuf>) -> Result<i32> {
    let project_root = project_root(cd)?;

    let tool_config_path = paths::default_tool_config_path(&project_root);
    let tool_config = ToolConfigFile::load(&tool_config_path)
        .with_context(|| format!("failed to load tool config at {}", tool_config_path.display()))?;

    let run_config_path = paths::default_run_config_path(&project_root);
    let run_config = RunConfig::load_or_default(&run_config_path)
        .with_context(|| format!("failed to load run config at {}", run_config_path.display()))?;

    let scripts_dir = paths::default_scripts_dir(&project_root);
    let mut tool_specs = build_cli_tool_specs(&tool_config);
    if scripts_dir.is_dir() {
        tool_specs.push(script_tool_spec());
    }

    let base_url = std::env::var("SKILL_AGENT_MODEL_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let api_key = std::env::var("SKILL_AGENT_MODEL_API_KEY").ok();
    let model_name = run_config
        .model_name
        .clone()
        .unwrap_or_else(|| "gpt-4.1".to_string());

    let adapters = Adapters {
        model: Arc::new(HttpModelEndpoint::new(base_url, api_key, model_name)),
        checkpoint: Arc::new(FileCheckpointStore::new(default_checkpoint_dir(&project_root))),
        skill_file: Arc::new(FileSkillFileStore),
        clock: Arc::new(SystemClock),
    };

    let gateway = SecurityGateway::new(tool_config, vec![scripts_dir.clone()], project_root.clone());
    let gate = StdioOperatorGate;

    let orchestrator = Orchestrator {
        adapters: &adapters,
        gateway: &gateway,
        tool_specs: &tool_specs,
        config: run_config,
        gate: &gate,
        global_context_path: paths::default_global_context_path(&project_root),
        script_roots: vec![scripts_dir],
    };

    let thread_id = thread_id.unwrap_or_else(|| ulid::Ulid::new().to_string());
    tracing::info!(thread_id = %thread_id, skill = %skill.display(), "starting run");

    match orchestrator.run(&skill, &thread_id).await {
        Ok(OrchestratorOutcome::Completed) => {
            println!("Run complete (thread {thread_id}).");
            Ok(0)
        }
        Ok(OrchestratorOutcome::OperatorRejectedPlan) => {
            println!("Plan rejected; nothing was executed.");
            Ok(0)
        }
        Ok(OrchestratorOutcome::OperatorAbortedAtEscalation { step_index }) => {
            println!("Run aborted by operator at step {step_index} (thread {thread_id}).");
            Ok(1)
        }
        Err(err) => {
            eprintln!("run failed: {err:#}");
            Ok(1)
        }
    }
}

fn validate_config(cd: Option<PathBuf>) -> Result<i32> {
    let project_root = project_root(cd)?;

    let tool_config_path = paths::default_tool_config_path(&project_root);
    match ToolConfigFile::load(&tool_config_path) {
        Ok(config) => {
            println!(
                "{}: {} tool(s), {} blocked pattern(s)",
                tool_config_path.display(),
                config.cli_whitelist.len(),
                config.blocked_patterns.len()
            );
        }
        Err(err) => {
            eprintln!("{}: {err:#}", tool_config_path.display());
            return Ok(1);
        }
    }

    let run_config_path = paths::default_run_config_path(&project_root);
    match RunConfig::load(&run_config_path) {
        Ok(Some(_)) => println!("{}: ok", run_config_path.display()),
        Ok(None) => println!("{}: not present, defaults apply", run_config_path.display()),
        Err(err) => {
            eprintln!("{}: {err:#}", run_config_path.display());
            return Ok(1);
        }
    }

    Ok(0)
}

fn show_memory(thread_id: String, cd: Option<PathBuf>) -> Result<i32> {
    let project_root = project_root(cd)?;
    let store = FileCheckpointStore::new(default_checkpoint_dir(&project_root));

    match store.load(&thread_id)? {
        Some(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(0)
        }
        None => {
            eprintln!("no checkpoint recorded for thread {thread_id}");
            Ok(1)
        }
    }
}
