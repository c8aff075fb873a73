use std::fmt;

use super::{
    note::translate_note,
    policy::should_skip,
};
use crate::{
    anki::{
        Note,
        NoteId,
        NoteStore,
    },
    core::{
        Result,
        TranslatorConfig,
    },
    providers::ProviderAdapter,
};

/// The user-facing side of a batch run.
pub trait BatchHost {
    /// Asked once, after pre-filtering and before any request is sent.
    fn confirm(&mut self, matched: usize, queued: usize) -> bool;

    /// Called before note `current` (1-based) of `total` is processed.
    fn progress(&mut self, current: usize, total: usize);

    fn finish_progress(&mut self) {}

    fn notify(&mut self, message: &str);

    fn report_errors(&mut self, errors: &[NoteError]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteError {
    pub note_id: NoteId,
    pub message: String,
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Note {}: {}", self.note_id, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub matched: usize,
    pub queued: usize,
    pub translated: usize,
    pub skipped: usize,
    pub errored: usize,
    pub errors: Vec<NoteError>,
}

impl BatchSummary {
    pub fn message(&self) -> String {
        format!(
            "Finished translating notes.\n\nTranslated: {}\nSkipped by rules: {}\nErrors: {}",
            self.translated, self.skipped, self.errored
        )
    }
}

pub fn errors_message(errors: &[NoteError]) -> String {
    let entries: Vec<String> = errors.iter().map(ToString::to_string).collect();
    format!("Some notes failed during translation:\n\n{}", entries.join("\n\n"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    EmptyQuery,
    NoMatches,
    NothingToDo { matched: usize },
    Cancelled,
    Completed(BatchSummary),
}

/// Tags a failed note with the error tag. Failures are only logged.
///
/// Works on a fresh handle from the store: the handle that failed may hold
/// field writes and tag changes that were never committed.
fn mark_failed<S: NoteStore>(store: &S, id: NoteId, tag_error: &str) {
    if tag_error.is_empty() {
        return;
    }
    let mut note = match store.get_note(id) {
        Ok(Some(note)) => note,
        Ok(None) => return,
        Err(e) => {
            log::warn!("Note {}: could not reload to save error tag: {}", id, e);
            return;
        }
    };
    if !note.add_tag(tag_error) {
        return;
    }
    if let Err(e) = note.flush() {
        log::warn!("Note {}: could not save error tag: {}", id, e);
    }
}

pub fn run_batch<S: NoteStore>(
    store: &S,
    query: &str,
    config: &TranslatorConfig,
    adapter: &dyn ProviderAdapter,
    host: &mut dyn BatchHost,
) -> Result<BatchOutcome> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(BatchOutcome::EmptyQuery);
    }

    let note_ids = store.find_notes(query)?;
    if note_ids.is_empty() {
        host.notify("No notes matched the given search query.");
        return Ok(BatchOutcome::NoMatches);
    }

    let matched = note_ids.len();
    let mut queued: Vec<NoteId> = Vec::new();
    for id in note_ids {
        match store.get_note(id) {
            Ok(Some(note)) if !should_skip(&note, config) => queued.push(id),
            Ok(_) => {}
            // Queued anyway; the processing loop records the error for it.
            Err(e) => {
                log::warn!("Note {}: could not be loaded for pre-filtering: {}", id, e);
                queued.push(id);
            }
        }
    }

    if queued.is_empty() {
        host.notify("All matched notes are already translated or skipped by rules.");
        return Ok(BatchOutcome::NothingToDo { matched });
    }

    if !host.confirm(matched, queued.len()) {
        return Ok(BatchOutcome::Cancelled);
    }

    log::info!(
        "Translating {} of {} matched notes with {}",
        queued.len(),
        matched,
        adapter.name()
    );

    let mut summary = BatchSummary {
        matched,
        queued: queued.len(),
        skipped: matched - queued.len(),
        ..Default::default()
    };

    let total = queued.len();
    for (i, id) in queued.into_iter().enumerate() {
        host.progress(i + 1, total);

        let mut note = match store.get_note(id) {
            Ok(Some(note)) => note,
            Ok(None) => {
                log::warn!("Note {} disappeared before it could be translated", id);
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                summary.errored += 1;
                summary.errors.push(NoteError { note_id: id, message: e.to_string() });
                continue;
            }
        };

        match translate_note(&mut note, config, adapter) {
            Ok(true) => summary.translated += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                log::debug!("Note {}: {}", id, e);
                summary.errored += 1;
                mark_failed(store, id, &config.tag_error);
                summary.errors.push(NoteError { note_id: id, message: e.to_string() });
            }
        }
    }
    host.finish_progress();

    let saved = store.save();
    if let Err(e) = &saved {
        log::error!("Failed to save collection: {}", e);
    }

    log::info!(
        "Batch finished: {} translated, {} skipped, {} errors",
        summary.translated,
        summary.skipped,
        summary.errored
    );
    host.notify(&summary.message());
    if !summary.errors.is_empty() {
        host.report_errors(&summary.errors);
    }

    saved?;
    Ok(BatchOutcome::Completed(summary))
}
