use std::collections::HashMap;

use log::debug;
use tokio::sync::{Mutex, RwLock};

use super::model::{Message, Preview};
use super::{Error, Key, Reporter, Warning};
use crate::integration::cache;
use crate::integration::store::Substrate;

pub struct Appended {
    pub messages: Vec<Message>,
    pub write_error: Option<Error>,
}

impl Appended {
    pub fn is_persisted(&self) -> bool {
        self.write_error.is_none()
    }
}

/// Message lists by conversation key, each stored whole under `chat_<key>`.
///
/// Appends are load, push, write as one step per store instance. Nothing is
/// coordinated across processes sharing a substrate: the last full-list write
/// wins.
pub struct ConversationStore {
    substrate: Substrate,
    reporter: Reporter,
    preview_budget: usize,
    // lists whose latest write failed; they win over the substrate
    unsaved: RwLock<HashMap<Key, Vec<Message>>>,
    append_lock: Mutex<()>,
}

impl ConversationStore {
    pub fn new(substrate: Substrate, reporter: Reporter, preview_budget: usize) -> Self {
        Self {
            substrate,
            reporter,
            preview_budget,
            unsaved: RwLock::new(HashMap::new()),
            append_lock: Mutex::new(()),
        }
    }
}

impl ConversationStore {
    pub async fn load(&self, key: &Key) -> Vec<Message> {
        if let Some(messages) = self.unsaved.read().await.get(key) {
            return messages.clone();
        }

        self.read(key).await
    }

    pub async fn append(&self, key: &Key, message: Message) -> super::Result<Appended> {
        if message.is_blank() {
            return Err(Error::EmptyMessage);
        }

        let _guard = self.append_lock.lock().await;

        let mut messages = self.load(key).await;
        if messages.iter().any(|m| m.id().eq(message.id())) {
            debug!("message {:?} already in {key}", message.id());
            return Ok(Appended {
                messages,
                write_error: None,
            });
        }

        messages.push(message);

        let write_error = match self.write(key, &messages).await {
            Ok(()) => {
                self.unsaved.write().await.remove(key);
                None
            }
            Err(e) => {
                self.reporter.report(&Warning::WriteFailed {
                    key: key.clone(),
                    cause: e.to_string(),
                });
                self.unsaved
                    .write()
                    .await
                    .insert(key.clone(), messages.clone());
                Some(e)
            }
        };

        Ok(Appended {
            messages,
            write_error,
        })
    }

    pub async fn preview(&self, key: &Key) -> Preview {
        let messages = self.load(key).await;
        Preview::of(&messages, self.preview_budget)
    }
}

impl ConversationStore {
    async fn read(&self, key: &Key) -> Vec<Message> {
        let raw = match self.substrate.get(&cache::Key::Chat(key.clone())).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                self.reporter.report(&Warning::ReadFailed {
                    key: key.clone(),
                    cause: e.to_string(),
                });
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => messages,
            Err(e) => {
                self.reporter.report(&Warning::CorruptStore {
                    key: key.clone(),
                    cause: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    async fn write(&self, key: &Key, messages: &[Message]) -> super::Result<()> {
        let raw = serde_json::to_string(messages)?;

        self.substrate
            .set(&cache::Key::Chat(key.clone()), &raw)
            .await
            .map_err(|cause| Error::PersistenceWriteFailed {
                key: key.clone(),
                cause,
            })
    }
}
