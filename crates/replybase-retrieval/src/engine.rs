//! Engine-level operations consumed by a presentation layer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use replybase_protocols::{
    ContentItem, MutationOutcome, RankOutcome, RegenerateReport, StoreError, DEFAULT_ID,
};
use replybase_store::{ContentStore, LinkGraph};

use crate::ranker::{HybridRanker, RankerConfig};

/// Answer selection plus corpus maintenance, reported through the
/// presentation-layer result contracts.
///
/// Every operation recovers failures at its boundary: `ask` always yields
/// text, mutations always yield a `MutationOutcome`.
pub struct AnswerEngine {
    store: Arc<ContentStore>,
    ranker: HybridRanker,
}

impl AnswerEngine {
    pub fn new(store: Arc<ContentStore>) -> Self {
        let ranker = HybridRanker::new(store.clone());
        Self { store, ranker }
    }

    pub fn with_config(store: Arc<ContentStore>, config: RankerConfig) -> Self {
        let ranker = HybridRanker::new(store.clone()).with_config(config);
        Self { store, ranker }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn ranker(&self) -> &HybridRanker {
        &self.ranker
    }

    /// Answer a free-text query, resolving no-match to the default item.
    pub async fn ask(&self, query: &str) -> String {
        match self.ranker.rank(query).await {
            RankOutcome::Match { id, content, score } => {
                debug!("answering with '{id}' (score {score:.3})");
                content
            }
            RankOutcome::NoMatch => self.store.get(DEFAULT_ID).await.content,
        }
    }

    /// Register a content item, computing and attaching a fresh embedding.
    ///
    /// Re-registering an id with identical content, name and keywords is
    /// idempotent; conflicting state is rejected before any mutation.
    pub async fn register(
        &self,
        id: &str,
        content: &str,
        name: Option<&str>,
        keywords: Vec<String>,
    ) -> MutationOutcome {
        if id.trim().is_empty() || content.trim().is_empty() {
            return MutationOutcome::failure("an id and non-empty content are required");
        }

        let name = name.unwrap_or(id);
        let mut cleaned: Vec<String> = Vec::new();
        for word in keywords {
            let word = word.trim();
            if !word.is_empty() && !cleaned.iter().any(|k| k == word) {
                cleaned.push(word.to_string());
            }
        }

        let existing = self.store.find(id).await;
        if let Some(existing) = &existing {
            if existing.content != content || existing.name != name || existing.keywords != cleaned
            {
                return MutationOutcome::failure(
                    StoreError::InvalidOperation(format!(
                        "'{id}' is already registered with different state"
                    ))
                    .to_string(),
                );
            }
        }

        let mut item = ContentItem::new(id, content)
            .with_name(name)
            .with_keywords(cleaned)
            .with_embedding(self.ranker.embedder().embed(content));
        if let Some(existing) = existing {
            item.recommended_ids = existing.recommended_ids;
        }

        match self.store.put(&item).await {
            Ok(()) => {
                info!("registered content item '{id}'");
                MutationOutcome::ok(format!("Registered '{id}'")).with_current(item.keywords)
            }
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }

    /// Recompute the embedding of every item, one at a time.
    ///
    /// A failure on one item is logged and collected; the remaining
    /// iteration always runs to completion.
    pub async fn regenerate_embeddings(&self) -> RegenerateReport {
        let items = self.store.list().await;
        let mut report = RegenerateReport {
            total: items.len(),
            ..Default::default()
        };

        for mut item in items {
            item.embedding = Some(self.ranker.embedder().embed(&item.content));
            match self.store.put(&item).await {
                Ok(()) => report.record_success(),
                Err(err) => {
                    warn!("failed to regenerate embedding for '{}': {err}", item.id);
                    report.record_failure(item.id, err.to_string());
                }
            }
        }

        info!(
            "regenerated embeddings for {}/{} items",
            report.updated, report.total
        );
        report
    }

    /// Delete an item; the link cleanup pass runs as part of the operation.
    pub async fn remove_content(&self, id: &str) -> MutationOutcome {
        match self.store.delete(id).await {
            Ok(cleaned) => {
                let mut message = format!("Deleted '{id}'");
                if cleaned > 0 {
                    message.push_str(&format!("; updated {cleaned} item(s) that referenced it"));
                }
                MutationOutcome::ok(message)
            }
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }

    pub async fn add_keywords(&self, id: &str, words: &[String]) -> MutationOutcome {
        match self.store.add_keywords(id, words).await {
            Ok(current) => {
                MutationOutcome::ok(format!("Keywords added to '{id}'")).with_current(current)
            }
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }

    pub async fn remove_keywords(&self, id: &str, words: Option<&[String]>) -> MutationOutcome {
        match self.store.remove_keywords(id, words).await {
            Ok((removed, current)) => MutationOutcome::ok(format!("Keywords removed from '{id}'"))
                .with_removed(removed)
                .with_current(current),
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }

    pub async fn add_link(&self, target_id: &str, recommended_id: &str) -> MutationOutcome {
        match LinkGraph::new(&self.store).add_link(target_id, recommended_id).await {
            Ok(current) => MutationOutcome::ok(format!(
                "Linked '{target_id}' to '{recommended_id}'"
            ))
            .with_current(current),
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }

    pub async fn remove_link(
        &self,
        target_id: &str,
        recommended_id: Option<&str>,
    ) -> MutationOutcome {
        match LinkGraph::new(&self.store).remove_link(target_id, recommended_id).await {
            Ok((removed, current)) => {
                MutationOutcome::ok(format!("Links removed from '{target_id}'"))
                    .with_removed(removed)
                    .with_current(current)
            }
            Err(err) => MutationOutcome::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
