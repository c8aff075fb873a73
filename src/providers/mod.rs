use std::sync::Arc;

pub mod extract;
pub mod gemini;
pub mod openai;
pub mod prompt;

pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use crate::core::{
    errors::byte_snippet,
    CredentialSource,
    Provider,
    Result,
    Transport,
    TranslatorConfig,
    TranslatorError,
};

/// What a provider returned for each side. `None` means no value came back
/// for that side, which is not the same as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    pub question: Option<String>,
    pub answer: Option<String>,
}

pub trait ProviderAdapter {
    fn name(&self) -> &'static str;

    /// One round trip. At least one side must be `Some`.
    fn translate(
        &self,
        question: Option<&str>,
        answer: Option<&str>,
        config: &TranslatorConfig,
    ) -> Result<TranslationResult>;
}

pub fn adapter_for(
    provider: Provider,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
) -> Box<dyn ProviderAdapter> {
    match provider {
        Provider::OpenAi => Box::new(OpenAiAdapter::new(transport, credentials)),
        Provider::Gemini => Box::new(GeminiAdapter::new(transport, credentials)),
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("Content-Type".to_string(), "application/json".to_string())]
}

fn malformed(provider: &'static str, reason: impl Into<String>, raw: &[u8]) -> TranslatorError {
    TranslatorError::MalformedEnvelope { provider, reason: reason.into(), raw: byte_snippet(raw) }
}
