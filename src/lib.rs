pub mod anki;
pub mod core;
pub mod persistence;
pub mod providers;
pub mod translate;

pub use crate::core::{
    Result,
    TranslatorConfig,
    TranslatorError,
};
