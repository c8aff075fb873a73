use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
        Mutex,
        MutexGuard,
    },
};

use super::note::{
    Note,
    NoteData,
    NoteId,
    NoteStore,
};
use crate::{
    core::{
        Result,
        TranslatorError,
    },
    persistence,
};

type SharedNotes = Arc<Mutex<BTreeMap<NoteId, NoteData>>>;

fn lock(notes: &SharedNotes) -> Result<MutexGuard<'_, BTreeMap<NoteId, NoteData>>> {
    notes.lock().map_err(|_| TranslatorError::Store("Failed to lock collection".to_string()))
}

/// Notes held in memory, optionally backed by a JSON file of [`NoteData`].
pub struct JsonCollection {
    path: Option<PathBuf>,
    notes: SharedNotes,
    saves: AtomicUsize,
}

impl JsonCollection {
    pub fn in_memory(notes: Vec<NoteData>) -> Self {
        Self {
            path: None,
            notes: Arc::new(Mutex::new(notes.into_iter().map(|n| (n.id, n)).collect())),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let notes: Vec<NoteData> = persistence::load_json(&path)?.ok_or_else(|| {
            TranslatorError::Store(format!("Collection file not found: {}", path.display()))
        })?;
        log::info!("Loaded {} notes from {}", notes.len(), path.display());

        let mut collection = Self::in_memory(notes);
        collection.path = Some(path);
        Ok(collection)
    }

    /// Snapshot of the committed state of a note.
    pub fn note_data(&self, id: NoteId) -> Option<NoteData> {
        lock(&self.notes).ok()?.get(&id).cloned()
    }

    pub fn all_notes(&self) -> Vec<NoteData> {
        lock(&self.notes).map(|notes| notes.values().cloned().collect()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl NoteStore for JsonCollection {
    type Note = CollectionNote;

    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>> {
        let terms = parse_query(query)?;
        let notes = lock(&self.notes)?;
        Ok(notes.values().filter(|n| terms.iter().all(|t| t.matches(n))).map(|n| n.id).collect())
    }

    fn get_note(&self, id: NoteId) -> Result<Option<CollectionNote>> {
        let data = lock(&self.notes)?.get(&id).cloned();
        Ok(data.map(|data| CollectionNote { data, notes: self.notes.clone() }))
    }

    fn save(&self) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if let Some(path) = &self.path {
            let notes: Vec<NoteData> = lock(&self.notes)?.values().cloned().collect();
            persistence::save_json(&notes, path)?;
        }
        Ok(())
    }
}

pub struct CollectionNote {
    data: NoteData,
    notes: SharedNotes,
}

impl Note for CollectionNote {
    fn id(&self) -> NoteId {
        self.data.id
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.data.fields.get(name).map(String::as_str)
    }

    fn set_field(&mut self, name: &str, value: String) -> Result<()> {
        self.data.set_field(name, value)
    }

    fn tags(&self) -> &[String] {
        &self.data.tags
    }

    fn add_tag(&mut self, tag: &str) -> bool {
        self.data.add_tag(tag)
    }

    fn remove_tag(&mut self, tag: &str) -> bool {
        self.data.remove_tag(tag)
    }

    fn flush(&mut self) -> Result<()> {
        lock(&self.notes)?.insert(self.data.id, self.data.clone());
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum QueryTerm {
    All,
    Tag(String),
    NotTag(String),
    Ids(Vec<NoteId>),
}

impl QueryTerm {
    fn matches(&self, note: &NoteData) -> bool {
        let has_tag = |tag: &str| note.tags.iter().any(|t| t.eq_ignore_ascii_case(tag));
        match self {
            QueryTerm::All => true,
            QueryTerm::Tag(tag) => has_tag(tag),
            QueryTerm::NotTag(tag) => !has_tag(tag),
            QueryTerm::Ids(ids) => ids.contains(&note.id),
        }
    }
}

/// Small subset of Anki search syntax. Terms are ANDed.
fn parse_query(query: &str) -> Result<Vec<QueryTerm>> {
    query
        .split_whitespace()
        .map(|term| {
            if term == "*" || term.starts_with("deck:") {
                Ok(QueryTerm::All)
            } else if let Some(tag) = term.strip_prefix("-tag:") {
                Ok(QueryTerm::NotTag(tag.to_string()))
            } else if let Some(tag) = term.strip_prefix("tag:") {
                Ok(QueryTerm::Tag(tag.to_string()))
            } else if let Some(ids) = term.strip_prefix("nid:") {
                ids.split(',')
                    .map(|id| id.parse::<NoteId>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(QueryTerm::Ids)
                    .map_err(|e| TranslatorError::Store(format!("Invalid note id in '{term}': {e}")))
            } else {
                Err(TranslatorError::Store(format!("Unsupported search term for collection file: '{term}'")))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JsonCollection {
        JsonCollection::in_memory(vec![
            NoteData::new(1).with_field("Front", "a").with_tag("renal"),
            NoteData::new(2).with_field("Front", "b").with_tag("Renal").with_tag("AI_Translated"),
            NoteData::new(3).with_field("Front", "c"),
        ])
    }

    #[test]
    fn test_query_terms() {
        let collection = sample();
        assert_eq!(collection.find_notes("deck:current").unwrap(), vec![1, 2, 3]);
        assert_eq!(collection.find_notes("").unwrap(), vec![1, 2, 3]);
        assert_eq!(collection.find_notes("tag:renal").unwrap(), vec![1, 2]);
        assert_eq!(collection.find_notes("tag:renal -tag:AI_Translated").unwrap(), vec![1]);
        assert_eq!(collection.find_notes("nid:3,1").unwrap(), vec![1, 3]);
        assert!(collection.find_notes("nid:x").is_err());
        assert!(collection.find_notes("Front:a").is_err());
    }

    #[test]
    fn test_changes_commit_on_flush() {
        let collection = sample();
        let mut note = collection.get_note(3).unwrap().unwrap();
        note.set_field("Front", "changed".to_string()).unwrap();
        note.add_tag("new");

        assert_eq!(collection.note_data(3).unwrap().fields["Front"], "c");
        note.flush().unwrap();

        let stored = collection.note_data(3).unwrap();
        assert_eq!(stored.fields["Front"], "changed");
        assert_eq!(stored.tags, vec!["new"]);
        assert!(collection.get_note(99).unwrap().is_none());
    }
}
