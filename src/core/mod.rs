pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;

pub use config::{
    Provider,
    TranslatorConfig,
};
pub use credentials::{
    require_credential,
    CredentialSource,
    EnvCredentials,
};
pub use errors::{
    Result,
    TranslatorError,
};
pub use http::{
    BlockingTransport,
    RuntimeTransport,
    Transport,
};
