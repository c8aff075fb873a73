use thiserror::Error;

/// Bytes of a raw body kept in error messages.
pub const SNIPPET_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Environment variable '{0}' is not set.")]
    MissingCredential(String),

    #[error("{}", transport_message(.status, .message, .body))]
    Transport { status: Option<u16>, message: String, body: String },

    #[error("Failed to parse {provider} response JSON: {reason}\nraw={raw}")]
    MalformedEnvelope { provider: &'static str, reason: String, raw: String },

    #[error("Failed to parse JSON in {provider} response: {reason}\ncontent={content}")]
    ResponseParse { provider: &'static str, reason: String, content: String },

    #[error("Field '{0}' does not exist in note type.")]
    FieldSchema(String),

    #[error("Note store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TranslatorError>;

fn transport_message(status: &Option<u16>, message: &str, body: &str) -> String {
    match status {
        Some(code) if body.is_empty() => format!("HTTP error {code}: {message}"),
        Some(code) => format!("HTTP error {code}: {message}\n{body}"),
        None => format!("Connection failed: {message}"),
    }
}

impl From<std::io::Error> for TranslatorError {
    fn from(error: std::io::Error) -> Self {
        TranslatorError::Io(Box::new(error))
    }
}

/// Lossy UTF-8 rendering of at most the first [`SNIPPET_LIMIT`] bytes.
pub fn byte_snippet(bytes: &[u8]) -> String {
    let end = bytes.len().min(SNIPPET_LIMIT);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// At most the first [`SNIPPET_LIMIT`] characters of `text`.
pub fn text_snippet(text: &str) -> String {
    text.chars().take(SNIPPET_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = TranslatorError::Transport {
            status: Some(429),
            message: "Too Many Requests".to_string(),
            body: "{\"error\":\"rate\"}".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 429: Too Many Requests\n{\"error\":\"rate\"}");

        let err = TranslatorError::Transport {
            status: None,
            message: "timed out".to_string(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Connection failed: timed out");
    }

    #[test]
    fn test_snippets_are_bounded() {
        let long = vec![b'a'; 2000];
        assert_eq!(byte_snippet(&long).len(), SNIPPET_LIMIT);
        assert_eq!(byte_snippet(b"short"), "short");

        let text: String = "日".repeat(600);
        assert_eq!(text_snippet(&text).chars().count(), SNIPPET_LIMIT);
    }
}
