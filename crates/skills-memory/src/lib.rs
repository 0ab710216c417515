//! The four-layer memory model (spec §4.2): L1 global context (read-only),
//! L2 skill memory (append-only), L3 loop context (per-step), L4
//! checkpoint (durable). No cross-leakage between layers: each lives in
//! its own module with its own lifecycle rules.

pub mod checkpoint;
pub mod l1;
pub mod l2;
pub mod l3;

pub use checkpoint::{default_checkpoint_dir, CheckpointStore, FileCheckpointStore, InMemoryCheckpointStore};
pub use l1::load_global_context;
pub use l2::{append_skill_memory, format_skill_memory, EMPTY_MEMORY_PLACEHOLDER};
pub use l3::clear_loop_messages;
