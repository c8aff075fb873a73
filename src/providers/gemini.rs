use std::sync::Arc;

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    extract::parse_translation,
    json_headers,
    malformed,
    prompt::{
        build_prompt,
        PromptStyle,
    },
    ProviderAdapter,
    TranslationResult,
};
use crate::core::{
    require_credential,
    CredentialSource,
    Result,
    Transport,
    TranslatorConfig,
};

const PROVIDER: &str = "Gemini";
const ACTION: &str = "generateContent";

// Only contents and temperature are sent; the v1 endpoint rejects the
// response_* generation options.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// `generateContent` adapter; the key travels in the URL query string.
pub struct GeminiAdapter {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
}

impl GeminiAdapter {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { transport, credentials }
    }
}

pub fn endpoint(config: &TranslatorConfig, api_key: &str) -> String {
    let base = config.gemini_api_base.trim_end_matches('/');
    format!("{base}/models/{}:{ACTION}?key={api_key}", config.gemini_model)
}

impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn translate(
        &self,
        question: Option<&str>,
        answer: Option<&str>,
        config: &TranslatorConfig,
    ) -> Result<TranslationResult> {
        let api_key = require_credential(self.credentials.as_ref(), &config.gemini_api_key_env)?;
        let url = endpoint(config, &api_key);

        let prompt = build_prompt(question, answer, config, PromptStyle::PlainText);
        let payload = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: &prompt }] }],
            generation_config: GenerationConfig { temperature: config.temperature },
        };
        let body = serde_json::to_vec(&payload)?;

        let resp_bytes = self.transport.post_json(&url, &json_headers(), &body)?;

        let envelope: GenerateResponse = serde_json::from_slice(&resp_bytes)
            .map_err(|e| malformed(PROVIDER, e.to_string(), &resp_bytes))?;
        let candidate = envelope
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| malformed(PROVIDER, "No candidates in Gemini response.", &resp_bytes))?;
        let content = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .ok_or_else(|| malformed(PROVIDER, "No content parts in Gemini response.", &resp_bytes))?
            .text
            .unwrap_or_default();

        if content.is_empty() {
            return Err(malformed(PROVIDER, "Gemini response was empty.", &resp_bytes));
        }

        parse_translation(PROVIDER, &content)
    }
}
