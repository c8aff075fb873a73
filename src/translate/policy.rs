use crate::{
    anki::Note,
    core::TranslatorConfig,
};

/// Looks up `name` on the note, treating an empty field name as unset.
pub fn configured_field<'n>(note: &'n impl Note, name: &str) -> Option<&'n str> {
    if name.is_empty() {
        return None;
    }
    note.field(name)
}

pub fn should_skip(note: &impl Note, config: &TranslatorConfig) -> bool {
    if config.skip_if_has_translated_tag
        && !config.tag_translated.is_empty()
        && note.has_tag(&config.tag_translated)
    {
        return true;
    }

    if config.skip_if_target_not_empty {
        let filled = |name: &str| configured_field(note, name).is_some_and(|v| !v.trim().is_empty());
        if filled(&config.question_target_field) || filled(&config.answer_target_field) {
            return true;
        }
    }

    false
}
