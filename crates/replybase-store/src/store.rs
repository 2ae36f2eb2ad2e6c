//! Cached content store over the backing key-value collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use replybase_protocols::{ContentItem, ContentKv, StoreError, StoredRecord, DEFAULT_ID};

use crate::links::LinkGraph;

/// Content returned for the default item when the backing store has none.
const FALLBACK_DEFAULT_CONTENT: &str =
    "Sorry, I don't have an answer for that. Try rephrasing your question.";

/// Decode a stored value into a content item.
///
/// Two-variant decode in fixed order: structured JSON record first, and on
/// failure the whole value becomes the content with a name derived from the
/// id.
pub fn decode_value(id: &str, raw: &str) -> ContentItem {
    match serde_json::from_str::<StoredRecord>(raw) {
        Ok(record) => record.into_item(id),
        Err(_) => ContentItem::from_raw_text(id, raw),
    }
}

/// Sole owner of all content item state.
///
/// Reads go through a lazily hydrated process-wide snapshot; every successful
/// write discards the whole snapshot. The cache is a disposable projection,
/// never a second source of truth. Without a bound collaborator the store
/// degrades to a read-only default-only dataset.
pub struct ContentStore {
    kv: Option<Arc<dyn ContentKv>>,
    cache: RwLock<Option<HashMap<String, ContentItem>>>,
    default_content: String,
}

impl ContentStore {
    /// Create a store over a backing collaborator.
    pub fn new(kv: Arc<dyn ContentKv>) -> Self {
        Self {
            kv: Some(kv),
            cache: RwLock::new(None),
            default_content: FALLBACK_DEFAULT_CONTENT.to_string(),
        }
    }

    /// Create a store with no collaborator bound. Reads see only the default
    /// item; writes fail with `BackingStoreUnavailable`.
    pub fn detached() -> Self {
        Self {
            kv: None,
            cache: RwLock::new(None),
            default_content: FALLBACK_DEFAULT_CONTENT.to_string(),
        }
    }

    /// Override the synthesized default item's content.
    pub fn with_default_content(mut self, content: impl Into<String>) -> Self {
        self.default_content = content.into();
        self
    }

    fn synthesized_default(&self) -> ContentItem {
        ContentItem::new(DEFAULT_ID, self.default_content.clone())
    }

    /// Discard the cached snapshot wholesale. The next read re-hydrates from
    /// the collaborator.
    pub fn invalidate(&self) {
        *self.cache.write() = None;
        debug!("content cache invalidated");
    }

    /// Current snapshot of the corpus, hydrating the cache if needed.
    ///
    /// Concurrent hydrations race benignly: every attempt reloads the same
    /// authoritative backing state. Collaborator failures during hydration
    /// degrade to a default-only snapshot and leave the cache unset so the
    /// next read retries.
    async fn snapshot(&self) -> HashMap<String, ContentItem> {
        if let Some(cached) = self.cache.read().as_ref() {
            return cached.clone();
        }

        let Some(kv) = &self.kv else {
            let mut map = HashMap::new();
            map.insert(DEFAULT_ID.to_string(), self.synthesized_default());
            return map;
        };

        let keys = match kv.list().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!("failed to list backing store, degrading to default-only: {err}");
                let mut map = HashMap::new();
                map.insert(DEFAULT_ID.to_string(), self.synthesized_default());
                return map;
            }
        };

        let mut map = HashMap::with_capacity(keys.len() + 1);
        for key in keys {
            match kv.get(&key).await {
                Ok(Some(raw)) => {
                    map.insert(key.clone(), decode_value(&key, &raw));
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("failed to read '{key}' from backing store, skipping: {err}");
                }
            }
        }

        map.entry(DEFAULT_ID.to_string())
            .or_insert_with(|| self.synthesized_default());

        info!("hydrated content cache with {} items", map.len());
        *self.cache.write() = Some(map.clone());
        map
    }

    /// Look up an item by id without the default fallback.
    pub async fn find(&self, id: &str) -> Option<ContentItem> {
        self.snapshot().await.remove(id)
    }

    /// Fetch an item by id, falling back to the default item when absent.
    pub async fn get(&self, id: &str) -> ContentItem {
        let mut snapshot = self.snapshot().await;
        match snapshot.remove(id) {
            Some(item) => item,
            None => snapshot
                .remove(DEFAULT_ID)
                .unwrap_or_else(|| self.synthesized_default()),
        }
    }

    /// Full current snapshot, ordered by id for stable enumeration.
    pub async fn list(&self) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self.snapshot().await.into_values().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    /// Upsert an item and invalidate the cache.
    pub async fn put(&self, item: &ContentItem) -> Result<(), StoreError> {
        let kv = self.kv.as_ref().ok_or(StoreError::BackingStoreUnavailable)?;

        let encoded = serde_json::to_string(&StoredRecord::from_item(item))?;
        kv.put(&item.id, &encoded).await?;
        self.invalidate();
        debug!("stored content item '{}'", item.id);
        Ok(())
    }

    /// Delete an item and purge it from every other item's recommendations.
    ///
    /// The cleanup pass runs as part of the same logical operation, so the
    /// store never reports completion while a dangling reference survives.
    /// Returns how many items the cleanup modified.
    pub async fn delete(&self, id: &str) -> Result<usize, StoreError> {
        if id == DEFAULT_ID {
            return Err(StoreError::InvalidOperation(
                "the default item cannot be deleted".to_string(),
            ));
        }

        let kv = self.kv.as_ref().ok_or(StoreError::BackingStoreUnavailable)?;

        if self.find(id).await.is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }

        kv.delete(id).await?;
        self.invalidate();

        let cleaned = LinkGraph::new(self).cleanup_on_delete(id).await;
        info!("deleted content item '{id}', cleaned {cleaned} referencing item(s)");
        Ok(cleaned)
    }

    /// Add curated keywords to an item. Returns the item's keywords after the
    /// mutation. Duplicates (case-sensitive exact) are rejected, not silently
    /// merged away.
    pub async fn add_keywords(&self, id: &str, words: &[String]) -> Result<Vec<String>, StoreError> {
        let mut item = self
            .find(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut added: Vec<String> = Vec::new();
        for word in words {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            if item.keywords.iter().any(|k| k == word) || added.iter().any(|k| k == word) {
                continue;
            }
            added.push(word.to_string());
        }

        if added.is_empty() {
            return Err(StoreError::InvalidOperation(format!(
                "no new keywords to add to '{id}'"
            )));
        }

        item.keywords.extend(added);
        self.put(&item).await?;
        Ok(item.keywords)
    }

    /// Remove curated keywords from an item. `None` clears all of them.
    /// Returns the removed keywords and the keywords remaining after the
    /// mutation.
    pub async fn remove_keywords(
        &self,
        id: &str,
        words: Option<&[String]>,
    ) -> Result<(Vec<String>, Vec<String>), StoreError> {
        let mut item = self
            .find(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = match words {
            None => std::mem::take(&mut item.keywords),
            Some(words) => {
                let removed: Vec<String> = item
                    .keywords
                    .iter()
                    .filter(|k| words.iter().any(|w| w.trim() == k.as_str()))
                    .cloned()
                    .collect();
                item.keywords.retain(|k| !removed.contains(k));
                removed
            }
        };

        if removed.is_empty() {
            return Err(StoreError::InvalidOperation(format!(
                "none of the given keywords are present on '{id}'"
            )));
        }

        self.put(&item).await?;
        Ok((removed, item.keywords))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
