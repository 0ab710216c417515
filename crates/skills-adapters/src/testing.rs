//! Deterministic test doubles for the adapter traits, used by this crate's
//! own tests and by downstream crates (skills-runner, skills-orchestrator)
//! that need a scripted model endpoint rather than a live HTTP call.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::model::{ChatOutcome, ChatRequest, ModelEndpoint};

/// Replays a fixed sequence of [`ChatOutcome`]s (or errors) in order,
/// ignoring the request content. Panics if called more times than the
/// script provides — a scripted test should account for every turn.
pub struct ScriptedModelEndpoint {
    script: Mutex<Vec<Result<ChatOutcome, AdapterError>>>,
}

impl ScriptedModelEndpoint {
    pub fn new(script: Vec<Result<ChatOutcome, AdapterError>>) -> Self {
        // Reverse once so `pop()` replays in the original given order.
        let mut reversed = script;
        reversed.reverse();
        Self {
            script: Mutex::new(reversed),
        }
    }
}

#[async_trait]
impl ModelEndpoint for ScriptedModelEndpoint {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatOutcome, AdapterError> {
        self.script
            .lock()
            .expect("scripted endpoint mutex poisoned")
            .pop()
            .expect("ScriptedModelEndpoint exhausted: test script did not account for this turn")
    }
}
