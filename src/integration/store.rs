use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::cache::Key;

pub type Result<T> = std::result::Result<T, Error>;
pub type Substrate = Arc<dyn Store + Send + Sync>;

/// Five megabytes, what browsers usually grant local storage per origin.
const DEFAULT_QUOTA: usize = 5 * 1024 * 1024;

/// String values by string key. No transactions, no ordering across keys.
#[async_trait]
pub trait Store {
    async fn get(&self, key: &Key) -> Result<Option<String>>;

    async fn set(&self, key: &Key, value: &str) -> Result<()>;

    async fn remove(&self, key: &Key) -> Result<()>;
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error(transparent)]
    _Redis(#[from] redis::RedisError),
}

#[derive(Clone)]
pub struct Config {
    quota: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
        }
    }
}

impl Config {
    pub fn env() -> Self {
        let quota = env::var("STORAGE_QUOTA")
            .ok()
            .and_then(|q| q.parse().ok())
            .unwrap_or(DEFAULT_QUOTA);
        Self { quota }
    }

    pub fn connect(&self) -> MemoryStore {
        MemoryStore::new(self.quota)
    }
}

/// In-process substrate. Sizes count key and value bytes together.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA)
    }
}

impl MemoryStore {
    pub fn new(quota: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            quota,
        }
    }

    pub async fn used(&self) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&key.to_string()).cloned())
    }

    async fn set(&self, key: &Key, value: &str) -> Result<()> {
        let key = key.to_string();
        let mut entries = self.entries.write().await;

        let used: usize = entries
            .iter()
            .filter(|(k, _)| **k != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        let needed = used + key.len() + value.len();

        if needed > self.quota {
            return Err(Error::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        entries.insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<()> {
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }
}

/// Wraps a `MemoryStore` and fails every read of the given keys, as a
/// dropped connection would. Writes go through.
#[cfg(test)]
pub(crate) struct UnreadableStore {
    pub inner: MemoryStore,
    unreadable: Vec<String>,
}

#[cfg(test)]
impl UnreadableStore {
    pub fn new(inner: MemoryStore, unreadable: &[Key]) -> Self {
        Self {
            inner,
            unreadable: unreadable.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Store for UnreadableStore {
    async fn get(&self, key: &Key) -> Result<Option<String>> {
        if self.unreadable.contains(&key.to_string()) {
            let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
            return Err(Error::_Redis(cause.into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &Key, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &Key) -> Result<()> {
        self.inner.remove(key).await
    }
}
