use std::{
    collections::{
        BTreeSet,
        HashMap,
    },
    sync::Arc,
};

use super::{
    api::AnkiConnect,
    note::{
        Note,
        NoteData,
        NoteId,
        NoteStore,
    },
};
use crate::core::Result;

/// Notes living in a running Anki, reached through AnkiConnect.
pub struct AnkiConnectStore {
    api: Arc<AnkiConnect>,
}

impl AnkiConnectStore {
    pub fn connect(url: &str) -> Result<Self> {
        let api = AnkiConnect::new(url)?;
        let version = api.get_version()?;
        log::info!("AnkiConnect is online. Version: {}", version);
        Ok(Self { api: Arc::new(api) })
    }
}

impl NoteStore for AnkiConnectStore {
    type Note = AnkiConnectNote;

    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>> {
        self.api.get_note_ids(query)
    }

    fn get_note(&self, id: NoteId) -> Result<Option<AnkiConnectNote>> {
        let note = self.api.get_notes(&[id])?.into_iter().next().and_then(|n| n.into_note_data());
        Ok(note.map(|data| AnkiConnectNote::new(data, self.api.clone())))
    }

    // Every AnkiConnect call is committed by Anki on its own.
    fn save(&self) -> Result<()> {
        log::debug!("AnkiConnect store: nothing pending to save");
        Ok(())
    }
}

pub struct AnkiConnectNote {
    data: NoteData,
    dirty_fields: BTreeSet<String>,
    added_tags: Vec<String>,
    removed_tags: Vec<String>,
    api: Arc<AnkiConnect>,
}

impl AnkiConnectNote {
    fn new(data: NoteData, api: Arc<AnkiConnect>) -> Self {
        Self {
            data,
            dirty_fields: BTreeSet::new(),
            added_tags: Vec::new(),
            removed_tags: Vec::new(),
            api,
        }
    }
}

impl Note for AnkiConnectNote {
    fn id(&self) -> NoteId {
        self.data.id
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.data.fields.get(name).map(String::as_str)
    }

    fn set_field(&mut self, name: &str, value: String) -> Result<()> {
        self.data.set_field(name, value)?;
        self.dirty_fields.insert(name.to_string());
        Ok(())
    }

    fn tags(&self) -> &[String] {
        &self.data.tags
    }

    fn add_tag(&mut self, tag: &str) -> bool {
        if !self.data.add_tag(tag) {
            return false;
        }
        self.removed_tags.retain(|t| t != tag);
        self.added_tags.push(tag.to_string());
        true
    }

    fn remove_tag(&mut self, tag: &str) -> bool {
        if !self.data.remove_tag(tag) {
            return false;
        }
        self.added_tags.retain(|t| t != tag);
        self.removed_tags.push(tag.to_string());
        true
    }

    fn flush(&mut self) -> Result<()> {
        let id = self.data.id;

        if !self.dirty_fields.is_empty() {
            let fields: HashMap<String, String> = self
                .dirty_fields
                .iter()
                .filter_map(|name| self.data.fields.get(name).map(|v| (name.clone(), v.clone())))
                .collect();
            self.api.update_note_fields(id, &fields)?;
            self.dirty_fields.clear();
        }
        if !self.added_tags.is_empty() {
            self.api.add_tags(&[id], &self.added_tags)?;
            self.added_tags.clear();
        }
        if !self.removed_tags.is_empty() {
            self.api.remove_tags(&[id], &self.removed_tags)?;
            self.removed_tags.clear();
        }

        log::debug!("Flushed note {}", id);
        Ok(())
    }
}
