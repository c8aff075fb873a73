use serde_json::Value;

use super::TranslationResult;
use crate::core::{
    errors::text_snippet,
    Result,
    TranslatorError,
};

const FENCE: &str = "```";

/// Candidate JSON text inside model output that may be wrapped in a code
/// fence or surrounded by prose.
pub fn extract_json_block(text: &str) -> String {
    let mut text = text.trim().to_string();

    if text.starts_with(FENCE) {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() >= 3 && lines[0].starts_with(FENCE) && lines[lines.len() - 1].starts_with(FENCE) {
            text = lines[1..lines.len() - 1].join("\n").trim().to_string();
        }
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text,
    }
}

/// Parses the `{"question", "answer"}` object out of `content`.
pub fn parse_translation(provider: &'static str, content: &str) -> Result<TranslationResult> {
    let candidate = extract_json_block(content);
    let parse_error = |reason: String| TranslatorError::ResponseParse {
        provider,
        reason,
        content: text_snippet(content),
    };

    let data: Value = serde_json::from_str(&candidate).map_err(|e| parse_error(e.to_string()))?;
    let Some(object) = data.as_object() else {
        return Err(parse_error("expected a JSON object".to_string()));
    };

    Ok(TranslationResult {
        question: side_value(object.get("question")),
        answer: side_value(object.get("answer")),
    })
}

fn side_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string().trim().to_string()),
    }
}
