//! The Verdict JSON schema handed to the Evaluator's Phase 2
//! structured-output request (spec §4.4, §3).

use serde_json::json;

pub fn verdict_structured_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["verdict", "feedback", "key_outputs"],
        "properties": {
            "verdict": { "type": "string", "enum": ["PASS", "FAIL"] },
            "feedback": { "type": "string" },
            "key_outputs": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            }
        }
    })
}
