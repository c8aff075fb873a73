use std::collections::HashMap;

use super::errors::{
    Result,
    TranslatorError,
};

/// Resolves a named secret at call time.
pub trait CredentialSource {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads the process environment on every lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl CredentialSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

pub fn require_credential(source: &dyn CredentialSource, name: &str) -> Result<String> {
    match source.lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TranslatorError::MissingCredential(name.to_string())),
    }
}
