//! The injected `Adapters` record (spec §9's redesign note): replaces the
//! source's global adapter singletons with a small struct the Orchestrator
//! threads through explicitly, so nodes are pure functions of
//! `(ExecutionState, Adapters)` rather than closures over module-level
//! mutable state.

use std::sync::Arc;

use skills_memory::CheckpointStore;

use crate::clock::Clock;
use crate::model::ModelEndpoint;
use crate::skill_file::SkillFileStore;

#[derive(Clone)]
pub struct Adapters {
    pub model: Arc<dyn ModelEndpoint>,
    pub checkpoint: Arc<dyn CheckpointStore>,
    pub skill_file: Arc<dyn SkillFileStore>,
    pub clock: Arc<dyn Clock>,
}
