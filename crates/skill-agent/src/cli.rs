use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn build_version() -> &'static str {
    static VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION.get_or_init(|| env!("CARGO_PKG_VERSION").to_string())
}

#[derive(Parser)]
#[command(name = "skill-agent", version = build_version())]
#[command(about = "Agentic skill execution engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Plan and run a skill file to completion.
    Run {
        /// Path to the skill markdown file.
        skill: PathBuf,

        /// Resume under an existing thread id; a fresh ULID is minted if omitted.
        #[arg(long)]
        thread_id: Option<String>,

        /// Project root (defaults to the current directory).
        #[arg(long)]
        cd: Option<PathBuf>,
    },

    /// Load the tool allow-list and run config and report whether they parse.
    ValidateConfig {
        /// Project root (defaults to the current directory).
        #[arg(long)]
        cd: Option<PathBuf>,
    },

    /// Print the L4 checkpoint recorded for a thread id, if any.
    ShowMemory {
        /// Thread id to look up.
        thread_id: String,

        /// Project root (defaults to the current directory).
        #[arg(long)]
        cd: Option<PathBuf>,
    },
}
