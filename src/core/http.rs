use std::time::Duration;

use reqwest::{
    header::{
        HeaderMap,
        HeaderName,
        HeaderValue,
    },
    StatusCode,
};
use tokio::runtime::{
    Builder,
    Runtime,
};

use super::errors::{
    byte_snippet,
    Result,
    TranslatorError,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single JSON POST round trip. Implementations never retry.
pub trait Transport {
    fn post_json(&self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<Vec<u8>>;
}

/// `url` with its query string removed, safe to log.
pub fn loggable_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(transport_failure)?;
        let value = HeaderValue::from_str(value).map_err(transport_failure)?;
        map.insert(name, value);
    }
    Ok(map)
}

fn transport_failure(error: impl std::fmt::Display) -> TranslatorError {
    TranslatorError::Transport { status: None, message: error.to_string(), body: String::new() }
}

fn status_failure(status: StatusCode, body: &[u8]) -> TranslatorError {
    TranslatorError::Transport {
        status: Some(status.as_u16()),
        message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
        body: byte_snippet(body),
    }
}

/// Plain blocking reqwest client.
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
}

impl BlockingTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport_failure(format!("HTTP client build failed: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for BlockingTransport {
    fn post_json(&self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<Vec<u8>> {
        log::debug!("POST {} ({} bytes)", loggable_url(url), body.len());

        let resp = self
            .client
            .post(url)
            .headers(header_map(headers)?)
            .body(body.to_vec())
            .send()
            .map_err(|e| transport_failure(e.without_url()))?;

        let status = resp.status();
        let bytes = resp.bytes().map_err(|e| transport_failure(e.without_url()))?;

        if !status.is_success() {
            return Err(status_failure(status, &bytes));
        }
        Ok(bytes.to_vec())
    }
}

/// Async reqwest client driven to completion on an owned current-thread
/// runtime. Same contract and timeout as [`BlockingTransport`].
pub struct RuntimeTransport {
    runtime: Runtime,
    client: reqwest::Client,
}

impl RuntimeTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| transport_failure(format!("Runtime build failed: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport_failure(format!("HTTP client build failed: {e}")))?;
        Ok(Self { runtime, client })
    }
}

impl Transport for RuntimeTransport {
    fn post_json(&self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<Vec<u8>> {
        log::debug!("POST {} ({} bytes)", loggable_url(url), body.len());

        let request = self.client.post(url).headers(header_map(headers)?).body(body.to_vec());

        self.runtime.block_on(async move {
            let resp = request.send().await.map_err(|e| transport_failure(e.without_url()))?;
            let status = resp.status();
            let bytes = resp.bytes().await.map_err(|e| transport_failure(e.without_url()))?;

            if !status.is_success() {
                return Err(status_failure(status, &bytes));
            }
            Ok::<Vec<u8>, TranslatorError>(bytes.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loggable_url_drops_query() {
        assert_eq!(
            loggable_url("https://example.test/v1/models/m:generateContent?key=secret"),
            "https://example.test/v1/models/m:generateContent"
        );
        assert_eq!(loggable_url("https://example.test/v1"), "https://example.test/v1");
    }

    #[test]
    fn test_invalid_header_is_transport_error() {
        let headers = vec![("Bad Header".to_string(), "x".to_string())];
        match header_map(&headers) {
            Err(TranslatorError::Transport { status: None, .. }) => {}
            other => panic!("Expected transport error, got {:?}", other.map(|m| m.len())),
        }
    }
}
