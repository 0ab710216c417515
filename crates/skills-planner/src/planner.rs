//! The Planner (spec §4.3): turns skill markdown plus historical sections
//! and the live tool catalog into a validated [`Plan`]. A structured-output
//! failure (model returns text that doesn't match the Plan schema) is
//! surfaced as `PLAN_INVALID`; the Orchestrator aborts before any step
//! executes.

use skills_adapters::{ChatOutcome, ChatRequest, ModelEndpoint, StructuredSchema};
use skills_core::{Message, Plan};

use crate::error::PlannerError;
use crate::schema::{normalize_plan_paths, plan_structured_schema};
use crate::scripts::{describe_catalog as describe_script_catalog, ScriptDescriptor};
use crate::skill_doc::SkillDocument;

const PLANNER_SYSTEM_PROMPT: &str = "You are the planning stage of an agentic skill-execution \
engine. Decompose the operator's goal into an ordered sequence of atomic steps. Each step is \
either tool-bound (performs exactly one I/O action, naming the tools it may use in \
`tools_hint`) or pure-reasoning (zero I/O actions, empty `tools_hint`) — never both. For any \
data that must cross a step boundary, the producing step's `evaluator_instruction` must name \
the key to extract, and the consuming step must not re-read the same file. Return only the \
structured Plan.";

pub struct Planner<'a> {
    model: &'a dyn ModelEndpoint,
}

impl<'a> Planner<'a> {
    pub fn new(model: &'a dyn ModelEndpoint) -> Self {
        Self { model }
    }

    pub async fn plan(
        &self,
        skill_text: &str,
        discovered_scripts: &[ScriptDescriptor],
        gateway_catalog_description: &str,
    ) -> Result<Plan, PlannerError> {
        if skill_text.trim().is_empty() {
            return Err(PlannerError::EmptySkill);
        }

        let doc = SkillDocument::parse(skill_text);
        let prompt = build_user_prompt(&doc, discovered_scripts, gateway_catalog_description);

        let request = ChatRequest::new(vec![
            Message::system(PLANNER_SYSTEM_PROMPT),
            Message::user(prompt),
        ])
        .with_structured_schema(StructuredSchema {
            name: "plan".to_string(),
            schema: plan_structured_schema(),
        });

        let outcome = self
            .model
            .chat(request)
            .await
            .map_err(|err| PlannerError::Transport(err.to_string()))?;

        let value = match outcome {
            ChatOutcome::Structured(value) => value,
            ChatOutcome::Message(_) => {
                return Err(PlannerError::PlanInvalid(
                    "planner endpoint returned a chat message, not a structured Plan".to_string(),
                ))
            }
        };

        let plan: Plan = serde_json::from_value(value)
            .map_err(|err| PlannerError::PlanInvalid(err.to_string()))?;

        plan.validate()
            .map_err(|err| PlannerError::PlanInvalid(err.to_string()))?;

        Ok(normalize_plan_paths(plan))
    }
}

fn build_user_prompt(
    doc: &SkillDocument,
    discovered_scripts: &[ScriptDescriptor],
    gateway_catalog_description: &str,
) -> String {
    let mut sections = vec![format!("<goal>\n{}\n</goal>", doc.body)];

    if !doc.success_cases.is_empty() {
        sections.push(format!(
            "<success_cases>\n{}\n</success_cases>",
            doc.success_cases.join("\n---\n")
        ));
    }
    if !doc.failure_cases.is_empty() {
        sections.push(format!(
            "<failure_cases>\n{}\n</failure_cases>",
            doc.failure_cases.join("\n---\n")
        ));
    }
    if !doc.operator_feedback.is_empty() {
        sections.push(format!(
            "<operator_feedback>\n{}\n</operator_feedback>",
            doc.operator_feedback.join("\n---\n")
        ));
    }

    let script_catalog = describe_script_catalog(discovered_scripts);
    sections.push(format!(
        "<tool_catalog>\n{gateway_catalog_description}\n{script_catalog}\n</tool_catalog>"
    ));

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skills_adapters::testing::ScriptedModelEndpoint;

    fn plan_json() -> serde_json::Value {
        json!({
            "goal": "Write ok to out.txt",
            "steps": [{
                "index": 0,
                "optimizer_instruction": "Write the word ok to out.txt using the write_text script",
                "evaluator_instruction": "Confirm out.txt contains exactly 'ok'; extract key written_path",
                "tools_hint": ["write_text"],
                "depends_on": []
            }]
        })
    }

    #[tokio::test]
    async fn empty_skill_is_rejected_before_any_model_call() {
        let endpoint = ScriptedModelEndpoint::new(vec![]);
        let planner = Planner::new(&endpoint);
        let err = planner.plan("   ", &[], "").await.unwrap_err();
        assert!(matches!(err, PlannerError::EmptySkill));
    }

    #[tokio::test]
    async fn happy_path_builds_a_validated_plan() {
        let endpoint = ScriptedModelEndpoint::new(vec![Ok(ChatOutcome::Structured(plan_json()))]);
        let planner = Planner::new(&endpoint);
        let plan = planner
            .plan("Write the word `ok` to `out.txt`.", &[], "- write_text: write literal text")
            .await
            .unwrap();
        assert_eq!(plan.goal, "Write ok to out.txt");
        assert_eq!(plan.len(), 1);
    }

    #[tokio::test]
    async fn non_sequential_indices_are_plan_invalid() {
        let bad_plan = json!({
            "goal": "demo",
            "steps": [{
                "index": 1,
                "optimizer_instruction": "do it",
                "evaluator_instruction": "check it",
                "tools_hint": [],
                "depends_on": []
            }]
        });
        let endpoint = ScriptedModelEndpoint::new(vec![Ok(ChatOutcome::Structured(bad_plan))]);
        let planner = Planner::new(&endpoint);
        let err = planner.plan("Do a thing.", &[], "").await.unwrap_err();
        assert!(matches!(err, PlannerError::PlanInvalid(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_plan_invalid() {
        let malformed = json!({"not_a_plan": true});
        let endpoint = ScriptedModelEndpoint::new(vec![Ok(ChatOutcome::Structured(malformed))]);
        let planner = Planner::new(&endpoint);
        let err = planner.plan("Do a thing.", &[], "").await.unwrap_err();
        assert!(matches!(err, PlannerError::PlanInvalid(_)));
    }

    #[tokio::test]
    async fn plan_text_response_instead_of_structured_is_invalid() {
        let endpoint = ScriptedModelEndpoint::new(vec![Ok(ChatOutcome::Message(
            Message::assistant_text("I refuse to use structured output"),
        ))]);
        let planner = Planner::new(&endpoint);
        let err = planner.plan("Do a thing.", &[], "").await.unwrap_err();
        assert!(matches!(err, PlannerError::PlanInvalid(_)));
    }
}
