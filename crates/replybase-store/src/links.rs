//! Directed recommendation links between content items.

use tracing::{debug, warn};

use replybase_protocols::StoreError;

use crate::store::ContentStore;

/// A recommendation edge resolved against the current snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink {
    pub id: String,
    /// Display name of the linked item, when it still exists.
    pub name: Option<String>,
}

/// Maintains and repairs the directed recommendation graph.
///
/// Edges live on the source item's `recommended_ids`; this manager enforces
/// the graph invariants (existing endpoints, no self-loops, no duplicates)
/// and purges dangling edges when an item is deleted.
pub struct LinkGraph<'a> {
    store: &'a ContentStore,
}

impl<'a> LinkGraph<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    /// Append a recommendation edge from `target_id` to `recommended_id`.
    /// Returns the target's outgoing edges after the mutation.
    pub async fn add_link(
        &self,
        target_id: &str,
        recommended_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        if target_id == recommended_id {
            return Err(StoreError::InvalidOperation(
                "an item cannot recommend itself".to_string(),
            ));
        }

        let mut target = self
            .store
            .find(target_id)
            .await
            .ok_or_else(|| StoreError::NotFound(target_id.to_string()))?;

        if self.store.find(recommended_id).await.is_none() {
            return Err(StoreError::NotFound(recommended_id.to_string()));
        }

        if target.recommended_ids.iter().any(|id| id == recommended_id) {
            return Err(StoreError::InvalidOperation(format!(
                "'{recommended_id}' is already recommended by '{target_id}'"
            )));
        }

        target.recommended_ids.push(recommended_id.to_string());
        self.store.put(&target).await?;
        debug!("linked '{target_id}' -> '{recommended_id}'");
        Ok(target.recommended_ids)
    }

    /// Remove one recommendation edge, or all of them when `recommended_id`
    /// is `None`. Returns the removed edges and the edges remaining after the
    /// mutation.
    pub async fn remove_link(
        &self,
        target_id: &str,
        recommended_id: Option<&str>,
    ) -> Result<(Vec<String>, Vec<String>), StoreError> {
        let mut target = self
            .store
            .find(target_id)
            .await
            .ok_or_else(|| StoreError::NotFound(target_id.to_string()))?;

        let removed = match recommended_id {
            None => std::mem::take(&mut target.recommended_ids),
            Some(id) => {
                let before = target.recommended_ids.len();
                target.recommended_ids.retain(|r| r != id);
                if target.recommended_ids.len() == before {
                    return Err(StoreError::InvalidOperation(format!(
                        "'{id}' is not recommended by '{target_id}'"
                    )));
                }
                vec![id.to_string()]
            }
        };

        if removed.is_empty() {
            return Err(StoreError::InvalidOperation(format!(
                "'{target_id}' has no recommendation links"
            )));
        }

        self.store.put(&target).await?;
        debug!("unlinked {removed:?} from '{target_id}'");
        Ok((removed, target.recommended_ids))
    }

    /// The target's outgoing edges with display names resolved against the
    /// current snapshot.
    pub async fn links_of(&self, target_id: &str) -> Result<Vec<ResolvedLink>, StoreError> {
        let target = self
            .store
            .find(target_id)
            .await
            .ok_or_else(|| StoreError::NotFound(target_id.to_string()))?;

        let mut resolved = Vec::with_capacity(target.recommended_ids.len());
        for id in target.recommended_ids {
            let name = self.store.find(&id).await.map(|item| item.name);
            resolved.push(ResolvedLink { id, name });
        }
        Ok(resolved)
    }

    /// Purge `deleted_id` from every remaining item's recommendations.
    ///
    /// Runs synchronously as part of a delete. Best-effort, not
    /// transactional: a failed persist is logged and the scan continues.
    /// Returns the number of items modified.
    pub async fn cleanup_on_delete(&self, deleted_id: &str) -> usize {
        let mut modified = 0;

        for mut item in self.store.list().await {
            if !item.recommended_ids.iter().any(|id| id == deleted_id) {
                continue;
            }

            item.recommended_ids.retain(|id| id != deleted_id);
            match self.store.put(&item).await {
                Ok(()) => {
                    debug!("removed dangling link '{deleted_id}' from '{}'", item.id);
                    modified += 1;
                }
                Err(err) => {
                    warn!(
                        "failed to persist link cleanup for '{}', skipping: {err}",
                        item.id
                    );
                }
            }
        }

        modified
    }
}

#[cfg(test)]
#[path = "links_tests.rs"]
mod tests;
