use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::note::{
    NoteData,
    NoteId,
};
use crate::core::{
    http::DEFAULT_TIMEOUT,
    Result,
    TranslatorError,
};

pub const DEFAULT_ANKI_URL: &str = "http://localhost:8765/";
const API_VERSION: u32 = 6;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub value: String,
}

/// `notesInfo` entry. Ids that no longer exist come back as `{}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    #[serde(default)]
    note_id: Option<NoteId>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    fields: HashMap<String, Field>,
}

impl NoteInfo {
    pub fn into_note_data(self) -> Option<NoteData> {
        let id = self.note_id?;
        Some(NoteData {
            id,
            fields: self.fields.into_iter().map(|(name, field)| (name, field.value)).collect(),
            tags: self.tags,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, action: &str) -> Result<Option<T>> {
        match self.error {
            Some(error) => Err(TranslatorError::Store(format!("AnkiConnect {action}: {error}"))),
            None => Ok(self.result),
        }
    }
}

/// Minimal AnkiConnect client.
pub struct AnkiConnect {
    client: Client,
    url: String,
}

impl AnkiConnect {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TranslatorError::Store(format!("HTTP client build failed: {e}")))?;
        Ok(Self { client, url: url.to_string() })
    }

    fn make_request<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> Result<Option<T>> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), Value::String(action.to_string()));
        body.insert("version".to_string(), Value::Number(API_VERSION.into()));

        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        let response: ApiResponse<T> = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .and_then(|resp| resp.json())
            .map_err(|e| TranslatorError::Store(format!("AnkiConnect {action} failed: {e}")))?;

        response.into_result(action)
    }

    pub fn get_version(&self) -> Result<u32> {
        Ok(self.make_request("version", None)?.unwrap_or_default())
    }

    pub fn get_note_ids(&self, query: &str) -> Result<Vec<NoteId>> {
        let params = serde_json::json!({ "query": query });
        Ok(self.make_request("findNotes", Some(params))?.unwrap_or_default())
    }

    pub fn get_notes(&self, note_ids: &[NoteId]) -> Result<Vec<NoteInfo>> {
        let params = serde_json::json!({ "notes": note_ids });
        Ok(self.make_request("notesInfo", Some(params))?.unwrap_or_default())
    }

    pub fn update_note_fields(&self, note_id: NoteId, fields: &HashMap<String, String>) -> Result<()> {
        let params = serde_json::json!({ "note": { "id": note_id, "fields": fields } });
        self.make_request::<Value>("updateNoteFields", Some(params))?;
        Ok(())
    }

    pub fn add_tags(&self, note_ids: &[NoteId], tags: &[String]) -> Result<()> {
        let params = serde_json::json!({ "notes": note_ids, "tags": tags.join(" ") });
        self.make_request::<Value>("addTags", Some(params))?;
        Ok(())
    }

    pub fn remove_tags(&self, note_ids: &[NoteId], tags: &[String]) -> Result<()> {
        let params = serde_json::json!({ "notes": note_ids, "tags": tags.join(" ") });
        self.make_request::<Value>("removeTags", Some(params))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_info_parsing() {
        let raw = r#"[
            {"noteId": 1502298033753, "modelName": "Basic", "tags": ["renal"],
             "fields": {"Front": {"value": "Kidney", "order": 0}, "Back": {"value": "Organ", "order": 1}},
             "mod": 1718377864, "cards": [1498938915662]},
            {}
        ]"#;
        let infos: Vec<NoteInfo> = serde_json::from_str(raw).unwrap();
        let mut notes = infos.into_iter().map(NoteInfo::into_note_data);

        let first = notes.next().flatten().unwrap();
        assert_eq!(first.id, 1502298033753);
        assert_eq!(first.fields["Front"], "Kidney");
        assert_eq!(first.tags, vec!["renal"]);

        assert!(notes.next().flatten().is_none());
    }

    #[test]
    fn test_api_error_is_store_error() {
        let resp: ApiResponse<Vec<NoteId>> =
            serde_json::from_str(r#"{"result": null, "error": "collection is not available"}"#)
                .unwrap();
        match resp.into_result("findNotes") {
            Err(TranslatorError::Store(msg)) => {
                assert_eq!(msg, "AnkiConnect findNotes: collection is not available")
            }
            other => panic!("Expected Store error, got {:?}", other),
        }
    }
}
