//! Backing key-value collaborator protocol.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;

/// Opaque key-value collaborator holding the persisted corpus.
///
/// Stored values are either a structured JSON record or bare raw text; the
/// store decides, this layer only moves strings. Durability and replication
/// are the collaborator's own concern.
#[async_trait]
pub trait ContentKv: Send + Sync {
    /// List all stored keys.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Fetch the value for a key, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Upsert a value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory `ContentKv` implementation.
///
/// Used by tests and embedded deployments that have no external collaborator.
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with initial entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ContentKv for MemoryKv {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let kv = MemoryKv::new();
        kv.put("faq", "billing text").await.unwrap();

        let value = kv.get("faq").await.unwrap();
        assert_eq!(value.as_deref(), Some("billing text"));
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let kv = MemoryKv::new();
        assert!(kv.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let kv = MemoryKv::with_entries([("b", "2"), ("a", "1"), ("c", "3")]);
        let keys = kv.list().await.unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let kv = MemoryKv::with_entries([("faq", "text")]);
        kv.delete("faq").await.unwrap();
        assert!(kv.get("faq").await.unwrap().is_none());

        // Deleting an absent key is not an error
        kv.delete("faq").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let kv = MemoryKv::new();
        kv.put("faq", "old").await.unwrap();
        kv.put("faq", "new").await.unwrap();

        assert_eq!(kv.get("faq").await.unwrap().as_deref(), Some("new"));
        assert_eq!(kv.len(), 1);
    }
}
