use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    Result,
    TranslatorError,
};

pub type NoteId = u64;

/// A host-owned note: named text fields plus a tag list. Changes stay local
/// to the handle until [`Note::flush`].
pub trait Note {
    fn id(&self) -> NoteId;

    fn field(&self, name: &str) -> Option<&str>;

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fails with [`TranslatorError::FieldSchema`] when `name` is not a field
    /// of this note's type.
    fn set_field(&mut self, name: &str, value: String) -> Result<()>;

    fn tags(&self) -> &[String];

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Returns false when the tag was already present.
    fn add_tag(&mut self, tag: &str) -> bool;

    fn remove_tag(&mut self, tag: &str) -> bool;

    fn flush(&mut self) -> Result<()>;
}

pub trait NoteStore {
    type Note: Note;

    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>>;

    /// `Ok(None)` when the id no longer resolves to a note.
    fn get_note(&self, id: NoteId) -> Result<Option<Self::Note>>;

    /// Store-wide commit, called once at the end of a batch.
    fn save(&self) -> Result<()>;
}

/// Plain field/tag payload shared by the store implementations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteData {
    pub id: NoteId,
    pub fields: HashMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteData {
    pub fn new(id: NoteId) -> Self {
        Self { id, fields: HashMap::new(), tags: Vec::new() }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    pub fn set_field(&mut self, name: &str, value: String) -> Result<()> {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TranslatorError::FieldSchema(name.to_string())),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}
