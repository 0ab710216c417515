//! External Adapters (spec §4.6): thin contracts around the model
//! endpoint, the checkpoint store (re-exported from `skills-memory`'s L4),
//! the skill file store, and a clock — bundled into a single injected
//! `Adapters` record per spec §9's anti-singleton redesign note.

pub mod adapters;
pub mod clock;
pub mod error;
pub mod model;
pub mod skill_file;
pub mod testing;

pub use adapters::Adapters;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::AdapterError;
pub use model::{ChatOutcome, ChatRequest, HttpModelEndpoint, ModelEndpoint, StructuredSchema, ToolSpec};
pub use skill_file::{FileSkillFileStore, SkillFileStore};
