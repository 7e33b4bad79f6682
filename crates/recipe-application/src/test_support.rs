//! In-memory collaborators shared by the unit tests of this crate.

use async_trait::async_trait;
use recipe_core::error::Result;
use recipe_core::location::Location;
use recipe_core::notification::{NotificationHandle, NotificationKind, Notifier, NotifyOptions};
use recipe_core::recipe::Recipe;
use recipe_core::storage::KeyValueStore;
use recipe_core::transport::{Transport, UploadFile};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String, Vec<(String, String)>),
    Post(String, Value),
    Put(String, Value),
    Delete(String),
    Upload(String, String),
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        match self {
            Call::Get(_, params) => params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }
}

type Handler = dyn Fn(&Call) -> Result<Value> + Send + Sync;

// Mock Transport answering every call through a handler closure
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
    gate: Option<Arc<Notify>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Call) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Responses are held back until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Get(..)))
            .collect()
    }

    async fn respond(&self, call: Call) -> Result<Value> {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.handler)(&call)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        self.respond(Call::Get(path.to_string(), params.to_vec())).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.respond(Call::Post(path.to_string(), body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.respond(Call::Put(path.to_string(), body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.respond(Call::Delete(path.to_string())).await.map(|_| ())
    }

    async fn upload(&self, path: &str, file: UploadFile) -> Result<Value> {
        self.respond(Call::Upload(path.to_string(), file.file_name))
            .await
    }
}

// Mock Notifier recording every notification
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(NotificationKind, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_with(
        &self,
        kind: NotificationKind,
        message: &str,
        _options: NotifyOptions,
    ) -> NotificationHandle {
        let mut sent = self.sent.lock().unwrap();
        sent.push((kind, message.to_string()));
        NotificationHandle(format!("n{}", sent.len()))
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.set(key, value);
        storage
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

#[derive(Default)]
pub struct MemoryLocation {
    pairs: Mutex<Vec<(String, String)>>,
    writes: Mutex<usize>,
}

impl MemoryLocation {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: Mutex::new(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            writes: Mutex::new(0),
        }
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.pairs
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl Location for MemoryLocation {
    fn query_pairs(&self) -> Vec<(String, String)> {
        self.pairs.lock().unwrap().clone()
    }

    fn replace_query_pairs(&self, pairs: &[(String, String)]) {
        *self.pairs.lock().unwrap() = pairs.to_vec();
        *self.writes.lock().unwrap() += 1;
    }
}

pub fn recipe(id: i64, title: &str) -> Recipe {
    serde_json::from_value(recipe_json(id, title)).unwrap()
}

pub fn recipe_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "ingredients": ["salt"],
        "instructions": ["cook"],
    })
}

pub fn page_json(items: Vec<Value>, page: u32) -> Value {
    let total = items.len();
    json!({
        "items": items,
        "total": total,
        "page": page,
        "page_size": 12,
        "total_pages": 1,
    })
}
