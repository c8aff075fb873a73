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
        SYSTEM_PROMPT,
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

const PROVIDER: &str = "OpenAI";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completions adapter authenticated with a bearer token.
pub struct OpenAiAdapter {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
}

impl OpenAiAdapter {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self { transport, credentials }
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn translate(
        &self,
        question: Option<&str>,
        answer: Option<&str>,
        config: &TranslatorConfig,
    ) -> Result<TranslationResult> {
        let api_key = require_credential(self.credentials.as_ref(), &config.openai_api_key_env)?;

        let user_prompt = build_prompt(question, answer, config, PromptStyle::JsonMode);
        let payload = ChatRequest {
            model: &config.openai_model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            temperature: config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };
        let body = serde_json::to_vec(&payload)?;

        let mut headers = json_headers();
        headers.push(("Authorization".to_string(), format!("Bearer {api_key}")));

        let resp_bytes = self.transport.post_json(&config.openai_api_base, &headers, &body)?;

        let envelope: ChatResponse = serde_json::from_slice(&resp_bytes)
            .map_err(|e| malformed(PROVIDER, e.to_string(), &resp_bytes))?;
        let content = envelope
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| malformed(PROVIDER, "No choices in OpenAI response.", &resp_bytes))?
            .message
            .content
            .unwrap_or_default();

        if content.is_empty() {
            return Err(malformed(PROVIDER, "OpenAI response was empty.", &resp_bytes));
        }

        parse_translation(PROVIDER, &content)
    }
}
