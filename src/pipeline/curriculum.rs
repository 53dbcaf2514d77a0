//! Curriculum generation: one chat completion, then defensive JSON parsing.
//!
//! Model replies are messy in two well-known ways, both handled here:
//!
//! * the JSON is wrapped in a Markdown code fence (```` ```json ... ``` ````),
//! * the JSON arrives as a *string containing* JSON, sometimes doubly encoded.
//!
//! Parsing unwraps string-encoded payloads at most twice before giving up
//! with [`CourseGenError::CurriculumParse`], which carries the raw reply so
//! the caller can inspect what the model actually said.

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use crate::llm::{ChatClient, ChatRequest, ChatResponse};
use crate::output::CurriculumPlan;
use crate::pipeline::split::RawModule;
use crate::prompts;
use tracing::{debug, warn};

/// Ask the model for a structured curriculum covering `modules`.
///
/// Single attempt: a failed call or unparseable reply is returned as an
/// error, never retried.
pub async fn generate_curriculum(
    client: &dyn ChatClient,
    modules: &[RawModule],
    config: &GenerationConfig,
) -> Result<(CurriculumPlan, ChatResponse), CourseGenError> {
    let request = ChatRequest {
        system: prompts::CURRICULUM_SYSTEM_PROMPT.to_string(),
        user: prompts::curriculum_user_prompt(modules),
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let response = client.complete(&request).await?;
    let plan = parse_curriculum(&response.content)?;

    debug!(
        course_title = %plan.course_title,
        modules = plan.modules.len(),
        "curriculum parsed"
    );
    Ok((plan, response))
}

/// Parse a model reply into a [`CurriculumPlan`].
pub fn parse_curriculum(reply: &str) -> Result<CurriculumPlan, CourseGenError> {
    let cleaned = strip_code_fences(reply);

    let mut value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| CourseGenError::CurriculumParse {
            detail: e.to_string(),
            raw: reply.to_string(),
        })?;

    // Some models return the JSON object as a (possibly doubly) encoded
    // string. Unwrap at most twice, then require an object.
    for _ in 0..2 {
        let serde_json::Value::String(inner) = value else {
            break;
        };
        warn!("curriculum reply was string-encoded JSON, decoding again");
        value = serde_json::from_str(&inner).map_err(|e| CourseGenError::CurriculumParse {
            detail: format!("string-encoded payload: {e}"),
            raw: reply.to_string(),
        })?;
    }

    serde_json::from_value(value).map_err(|e| CourseGenError::CurriculumParse {
        detail: e.to_string(),
        raw: reply.to_string(),
    })
}

/// Strip a leading ```` ```json ```` / ```` ``` ```` fence and a trailing
/// ```` ``` ```` fence, if present. Unfenced input passes through untouched.
fn strip_code_fences(reply: &str) -> &str {
    let mut s = reply.trim();
    for prefix in ["```json", "```"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest;
            break;
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "course_title": "Rust Basics",
        "course_description": "An introduction.",
        "course_cover_image_prompt": "A cover",
        "modules": [
            {"module_number": 1, "module_title": "Ownership",
             "module_image_prompt": "An image", "module_content": "Text."}
        ]
    }"#;

    #[test]
    fn parses_bare_json() {
        let plan = parse_curriculum(PLAN).unwrap();
        assert_eq!(plan.course_title, "Rust Basics");
        assert_eq!(plan.modules[0].module_number, Some(1));
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{PLAN}\n```");
        let plan = parse_curriculum(&fenced).unwrap();
        assert_eq!(plan.course_title, "Rust Basics");
    }

    #[test]
    fn parses_plain_fence() {
        let fenced = format!("```\n{PLAN}\n```");
        assert!(parse_curriculum(&fenced).is_ok());
    }

    #[test]
    fn parses_string_encoded_json() {
        let encoded = serde_json::to_string(PLAN).unwrap();
        let plan = parse_curriculum(&encoded).unwrap();
        assert_eq!(plan.course_title, "Rust Basics");
    }

    #[test]
    fn parses_doubly_string_encoded_json() {
        let once = serde_json::to_string(PLAN).unwrap();
        let twice = serde_json::to_string(&once).unwrap();
        let plan = parse_curriculum(&twice).unwrap();
        assert_eq!(plan.course_title, "Rust Basics");
    }

    #[test]
    fn triple_encoding_fails() {
        let once = serde_json::to_string(PLAN).unwrap();
        let twice = serde_json::to_string(&once).unwrap();
        let thrice = serde_json::to_string(&twice).unwrap();
        // After two unwraps the value is still a string, not an object.
        assert!(parse_curriculum(&thrice).is_err());
    }

    #[test]
    fn non_json_reply_carries_raw_text() {
        let err = parse_curriculum("Sorry, I cannot do that.").unwrap_err();
        match err {
            CourseGenError::CurriculumParse { raw, .. } => {
                assert_eq!(raw, "Sorry, I cannot do that.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sparse_plan_fills_defaults() {
        let plan = parse_curriculum(r#"{"course_title":"T"}"#).unwrap();
        assert_eq!(plan.course_title, "T");
        assert!(plan.modules.is_empty());
        assert!(plan.course_description.is_empty());
    }

    #[test]
    fn fence_stripping_leaves_unfenced_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    }
}
