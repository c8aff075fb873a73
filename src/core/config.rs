use std::path::Path;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::errors::{
    Result,
    TranslatorError,
};
use crate::persistence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }
}

// Anything that is not "gemini" falls back to OpenAI.
impl From<String> for Provider {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "gemini" => Provider::Gemini,
            _ => Provider::OpenAi,
        }
    }
}

impl From<Provider> for String {
    fn from(value: Provider) -> Self {
        value.as_str().to_string()
    }
}

/// One coherent settings snapshot. Keys missing from the stored document
/// take the values from [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub provider: Provider,

    pub openai_model: String,
    pub openai_api_base: String,
    pub openai_api_key_env: String,

    pub gemini_model: String,
    pub gemini_api_base: String,
    pub gemini_api_key_env: String,

    pub source_language: String,
    pub target_language: String,

    pub question_source_field: String,
    pub question_target_field: String,
    pub answer_source_field: String,
    pub answer_target_field: String,

    pub translate_question: bool,
    pub translate_answer: bool,

    pub max_chars_per_field: usize,
    pub temperature: f64,
    pub batch_query_default: String,

    pub tag_translated: String,
    pub tag_error: String,

    pub skip_if_target_not_empty: bool,
    pub skip_if_has_translated_tag: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_base: "https://api.openai.com/v1/chat/completions".to_string(),
            openai_api_key_env: "OPENAI_API_KEY".to_string(),
            gemini_model: "gemini-2.5-flash-lite".to_string(),
            gemini_api_base: "https://generativelanguage.googleapis.com/v1".to_string(),
            gemini_api_key_env: "GEMINI_API_KEY".to_string(),
            source_language: "English".to_string(),
            target_language: "Japanese".to_string(),
            question_source_field: "Front".to_string(),
            question_target_field: "Front_jp".to_string(),
            answer_source_field: "Back".to_string(),
            answer_target_field: "Back_jp".to_string(),
            translate_question: true,
            translate_answer: true,
            max_chars_per_field: 800,
            temperature: 0.1,
            batch_query_default: "deck:current".to_string(),
            tag_translated: "AI_Translated".to_string(),
            tag_error: "AI_TranslateError".to_string(),
            skip_if_target_not_empty: true,
            skip_if_has_translated_tag: true,
        }
    }
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(TranslatorError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| TranslatorError::Config(format!("Failed to parse settings: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the snapshot stored at `path`, or the defaults when nothing
    /// has been saved yet.
    pub fn load(path: &Path) -> Result<Self> {
        match persistence::load_json::<Value>(path)? {
            Some(value) => Self::from_value(value),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        persistence::save_json(self, path)
    }

    /// Removes the stored snapshot so the next load yields the defaults.
    /// Returns false when nothing was stored.
    pub fn reset(path: &Path) -> Result<bool> {
        persistence::delete_data_file(path)
    }

    /// Returns a copy with `key` replaced. `raw` is read as JSON when it
    /// parses, otherwise as a plain string.
    pub fn with_setting(&self, key: &str, raw: &str) -> Result<Self> {
        let mut document = serde_json::to_value(self)?;
        let Some(map) = document.as_object_mut() else {
            return Err(TranslatorError::Config("settings are not a JSON object".to_string()));
        };
        if !map.contains_key(key) {
            return Err(TranslatorError::Config(format!("unknown setting '{key}'")));
        }

        let value = match serde_json::from_str::<Value>(raw) {
            Ok(parsed) if !matches!(map.get(key), Some(Value::String(_))) => parsed,
            Ok(Value::String(s)) => Value::String(s),
            _ => Value::String(raw.to_string()),
        };
        map.insert(key.to_string(), value);

        Self::from_value(document)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = TranslatorConfig::from_value(json!({
            "provider": "Gemini",
            "target_language": "German",
            "max_chars_per_field": 20,
            "not_a_setting": 1,
        }))
        .unwrap();

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.target_language, "German");
        assert_eq!(config.max_chars_per_field, 20);
        assert_eq!(config.source_language, "English");
        assert_eq!(config.tag_translated, "AI_Translated");
        assert!(config.skip_if_has_translated_tag);
    }

    #[test]
    fn test_unknown_provider_falls_back_to_openai() {
        let config = TranslatorConfig::from_value(json!({ "provider": "claude" })).unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            TranslatorConfig::from_value(json!({ "temperature": 2.5 })),
            Err(TranslatorError::Config(_))
        ));
        assert!(matches!(
            TranslatorConfig::from_value(json!({ "max_chars_per_field": -1 })),
            Err(TranslatorError::Config(_))
        ));
    }

    #[test]
    fn test_with_setting() {
        let config = TranslatorConfig::default();

        let updated = config.with_setting("temperature", "0.7").unwrap();
        assert_eq!(updated.temperature, 0.7);

        let updated = config.with_setting("translate_answer", "false").unwrap();
        assert!(!updated.translate_answer);

        // String settings keep numeric-looking input as text.
        let updated = config.with_setting("question_target_field", "123").unwrap();
        assert_eq!(updated.question_target_field, "123");

        assert!(config.with_setting("no_such_key", "1").is_err());
        assert!(config.with_setting("max_chars_per_field", "lots").is_err());
    }
}
