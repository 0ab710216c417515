//! The Planner (spec §4.3): parses skill markdown plus historical
//! sections and the live tool catalog into a validated [`skills_core::Plan`].

pub mod error;
pub mod planner;
pub mod schema;
pub mod scripts;
pub mod skill_doc;

pub use error::PlannerError;
pub use planner::Planner;
pub use schema::{normalize_plan_paths, normalize_path_tokens, plan_structured_schema};
pub use scripts::{discover_scripts, ScriptDescriptor};
pub use skill_doc::SkillDocument;
