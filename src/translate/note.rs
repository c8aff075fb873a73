use super::policy::{
    configured_field,
    should_skip,
};
use crate::{
    anki::Note,
    core::{
        Result,
        TranslatorConfig,
        TranslatorError,
    },
    providers::ProviderAdapter,
};

/// Source text for one side, or `None` when the side is disabled, its
/// field is missing, or the text is over the character ceiling.
fn source_text(note: &impl Note, enabled: bool, field: &str, max_chars: usize) -> Option<String> {
    if !enabled {
        return None;
    }
    let text = configured_field(note, field)?;
    let len = text.chars().count();
    if len > max_chars {
        log::debug!(
            "Note {}: field '{}' has {} chars (limit {}), not translated",
            note.id(),
            field,
            len,
            max_chars
        );
        return None;
    }
    Some(text.to_string())
}

/// Translates one note in place and flushes it.
///
/// Returns `Ok(false)` when the note is skipped by rules or has nothing
/// to send; no request is made in that case. Adapter and transport errors
/// are returned unchanged, and the note is left unmodified.
pub fn translate_note(
    note: &mut impl Note,
    config: &TranslatorConfig,
    adapter: &dyn ProviderAdapter,
) -> Result<bool> {
    if should_skip(note, config) {
        log::debug!("Note {}: skipped by rules", note.id());
        return Ok(false);
    }

    let max_chars = config.max_chars_per_field;
    let question =
        source_text(note, config.translate_question, &config.question_source_field, max_chars);
    let answer = source_text(note, config.translate_answer, &config.answer_source_field, max_chars);

    if question.is_none() && answer.is_none() {
        log::debug!("Note {}: nothing to translate", note.id());
        return Ok(false);
    }

    let result = adapter.translate(question.as_deref(), answer.as_deref(), config)?;

    let mut writes: Vec<(&str, String)> = Vec::new();
    if config.translate_question {
        if let Some(text) = result.question {
            writes.push((config.question_target_field.as_str(), text));
        }
    }
    if config.translate_answer {
        if let Some(text) = result.answer {
            writes.push((config.answer_target_field.as_str(), text));
        }
    }
    // An empty target name means the side has nowhere to go.
    writes.retain(|(field, _)| !field.is_empty());

    if let Some((missing, _)) = writes.iter().find(|(field, _)| !note.has_field(field)) {
        return Err(TranslatorError::FieldSchema(missing.to_string()));
    }
    for (field, text) in writes {
        note.set_field(field, text)?;
    }

    if !config.tag_translated.is_empty() {
        note.add_tag(&config.tag_translated);
    }
    if !config.tag_error.is_empty() {
        note.remove_tag(&config.tag_error);
    }

    note.flush()?;
    log::debug!("Note {}: translated via {}", note.id(), adapter.name());
    Ok(true)
}
