#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{
        HashMap,
        HashSet,
        VecDeque,
    },
    rc::Rc,
    sync::{
        Arc,
        Mutex,
    },
};

use anki_card_translator::{
    anki::{
        CollectionNote,
        JsonCollection,
        Note,
        NoteData,
        NoteId,
        NoteStore,
    },
    core::{
        CredentialSource,
        Result,
        Transport,
        TranslatorError,
    },
    providers::{
        ProviderAdapter,
        TranslationResult,
    },
    translate::{
        BatchHost,
        NoteError,
    },
    TranslatorConfig,
};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }
}

/// Replays scripted responses in order and records every request.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body.to_string().into_bytes()));
    }

    pub fn push_raw(&self, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(body.as_bytes().to_vec()));
    }

    pub fn push_error(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Err(TranslatorError::Transport {
            status: Some(status),
            message: "scripted failure".to_string(),
            body: body.to_string(),
        }));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    fn post_json(&self, url: &str, headers: &[(String, String)], body: &[u8]) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.to_vec(),
            body: serde_json::from_slice(body).unwrap(),
        });
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(TranslatorError::Transport {
                status: None,
                message: "no scripted response".to_string(),
                body: String::new(),
            })
        })
    }
}

pub fn credentials(pairs: &[(&str, &str)]) -> Arc<dyn CredentialSource> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Arc::new(map)
}

pub fn openai_envelope(content: &str) -> Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

pub fn gemini_envelope(text: &str) -> Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

type Reply = Box<dyn Fn(Option<&str>, Option<&str>) -> Result<TranslationResult>>;

/// Adapter that answers from a closure and records what it was sent.
pub struct ScriptedAdapter {
    reply: Reply,
    calls: RefCell<Vec<(Option<String>, Option<String>)>>,
}

impl ScriptedAdapter {
    pub fn new(reply: impl Fn(Option<&str>, Option<&str>) -> Result<TranslationResult> + 'static) -> Self {
        Self { reply: Box::new(reply), calls: RefCell::new(Vec::new()) }
    }

    /// Answers with "<text> (ja)" for every side it receives.
    pub fn echo() -> Self {
        Self::new(|q, a| {
            Ok(TranslationResult {
                question: q.map(|q| format!("{q} (ja)")),
                answer: a.map(|a| format!("{a} (ja)")),
            })
        })
    }

    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.calls.borrow().clone()
    }
}

impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn translate(
        &self,
        question: Option<&str>,
        answer: Option<&str>,
        _config: &TranslatorConfig,
    ) -> Result<TranslationResult> {
        self.calls.borrow_mut().push((question.map(String::from), answer.map(String::from)));
        (self.reply)(question, answer)
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub decline: bool,
    pub confirmations: Vec<(usize, usize)>,
    pub progress: Vec<(usize, usize)>,
    pub notices: Vec<String>,
    pub reported: Vec<NoteError>,
}

impl BatchHost for RecordingHost {
    fn confirm(&mut self, matched: usize, queued: usize) -> bool {
        self.confirmations.push((matched, queued));
        !self.decline
    }

    fn progress(&mut self, current: usize, total: usize) {
        self.progress.push((current, total));
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn report_errors(&mut self, errors: &[NoteError]) {
        self.reported.extend_from_slice(errors);
    }
}

pub fn card(id: NoteId, front: &str, back: &str) -> NoteData {
    NoteData::new(id)
        .with_field("Front", front)
        .with_field("Back", back)
        .with_field("Front_jp", "")
        .with_field("Back_jp", "")
}

/// Wraps a collection with scripted failures: reading a note listed in
/// `unreadable` fails, and flushes of a note fail while its counter in
/// `flush_failures` is above zero.
pub struct FlakyStore {
    pub inner: JsonCollection,
    flush_failures: Rc<RefCell<HashMap<NoteId, usize>>>,
    unreadable: HashSet<NoteId>,
}

impl FlakyStore {
    pub fn new(inner: JsonCollection) -> Self {
        Self { inner, flush_failures: Rc::default(), unreadable: HashSet::new() }
    }

    /// The next `times` flushes of note `id` fail.
    pub fn fail_flushes(self, id: NoteId, times: usize) -> Self {
        self.flush_failures.borrow_mut().insert(id, times);
        self
    }

    pub fn unreadable(mut self, id: NoteId) -> Self {
        self.unreadable.insert(id);
        self
    }
}

pub struct FlakyNote {
    inner: CollectionNote,
    flush_failures: Rc<RefCell<HashMap<NoteId, usize>>>,
}

impl Note for FlakyNote {
    fn id(&self) -> NoteId {
        self.inner.id()
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.inner.field(name)
    }

    fn set_field(&mut self, name: &str, value: String) -> Result<()> {
        self.inner.set_field(name, value)
    }

    fn tags(&self) -> &[String] {
        self.inner.tags()
    }

    fn add_tag(&mut self, tag: &str) -> bool {
        self.inner.add_tag(tag)
    }

    fn remove_tag(&mut self, tag: &str) -> bool {
        self.inner.remove_tag(tag)
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(remaining) = self.flush_failures.borrow_mut().get_mut(&self.inner.id()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TranslatorError::Store("collection is read-only".to_string()));
            }
        }
        self.inner.flush()
    }
}

impl NoteStore for FlakyStore {
    type Note = FlakyNote;

    fn find_notes(&self, query: &str) -> Result<Vec<NoteId>> {
        self.inner.find_notes(query)
    }

    fn get_note(&self, id: NoteId) -> Result<Option<FlakyNote>> {
        if self.unreadable.contains(&id) {
            return Err(TranslatorError::Store(format!("note {id} could not be read")));
        }
        let flush_failures = self.flush_failures.clone();
        Ok(self.inner.get_note(id)?.map(|inner| FlakyNote { inner, flush_failures }))
    }

    fn save(&self) -> Result<()> {
        self.inner.save()
    }
}
