//! L3 — Loop Context (spec §4.2): per-step chat context, cleared at step
//! start and grown during the loop. `ExecutionState::prepare_step` owns
//! the actual reset; [`clear_loop_messages`] is the spec-named free
//! function the Step Runner calls to produce the empty sequence it resets
//! L3 with atomically.

use skills_core::Message;

/// `clear_loop_messages() -> list` (spec §4.2): emits the empty sequence
/// used to reset L3 atomically before seeding `[system, user]`.
pub fn clear_loop_messages() -> Vec<Message> {
    Vec::new()
}
