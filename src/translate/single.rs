use super::note::translate_note;
use crate::{
    anki::{
        NoteId,
        NoteStore,
    },
    core::{
        Result,
        TranslatorConfig,
    },
    providers::ProviderAdapter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleOutcome {
    Translated,
    Skipped,
    NoteNotFound,
}

impl SingleOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SingleOutcome::Translated => "Translation applied to the current note.",
            SingleOutcome::Skipped => "Nothing to translate for this note (skipped by rules).",
            SingleOutcome::NoteNotFound => "Note not found.",
        }
    }
}

/// Runs the pipeline for exactly one note. Errors are returned unchanged
/// and the note is not tagged as failed.
pub fn translate_single<S: NoteStore>(
    store: &S,
    note_id: NoteId,
    config: &TranslatorConfig,
    adapter: &dyn ProviderAdapter,
) -> Result<SingleOutcome> {
    let Some(mut note) = store.get_note(note_id)? else {
        return Ok(SingleOutcome::NoteNotFound);
    };

    if translate_note(&mut note, config, adapter)? {
        Ok(SingleOutcome::Translated)
    } else {
        Ok(SingleOutcome::Skipped)
    }
}
