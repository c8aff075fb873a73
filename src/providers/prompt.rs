use crate::core::TranslatorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// The request itself asks for JSON output.
    JsonMode,
    /// Free-form generation; the prompt alone has to keep the output clean.
    PlainText,
}

pub const SYSTEM_PROMPT: &str = "You are a precise bilingual translator for Anki flashcards. \
     Preserve technical and medical terminology. \
     Use plain text only (no markdown or HTML).";

pub fn build_prompt(
    question: Option<&str>,
    answer: Option<&str>,
    config: &TranslatorConfig,
    style: PromptStyle,
) -> String {
    let mut parts: Vec<String> = vec![
        format!("Source language: {}", config.source_language),
        format!("Target language: {}", config.target_language),
        "Translate the following Anki card fields.".to_string(),
    ];

    match style {
        PromptStyle::JsonMode => {
            parts.push("Return ONLY JSON, no extra text, in this format:".to_string());
            parts.push(r#"{"question": "...", "answer": "..."}"#.to_string());
        }
        PromptStyle::PlainText => {
            parts.push("Return ONLY a JSON object in this format:".to_string());
            parts.push(r#"{"question": "...", "answer": "..."}"#.to_string());
            parts.push("No extra commentary, no markdown, no HTML.".to_string());
        }
    }
    parts.push(String::new());

    if let Some(question) = question {
        parts.push("Original QUESTION:".to_string());
        parts.push(question.to_string());
        parts.push(String::new());
    }
    if let Some(answer) = answer {
        parts.push("Original ANSWER:".to_string());
        parts.push(answer.to_string());
    }

    parts.join("\n")
}
