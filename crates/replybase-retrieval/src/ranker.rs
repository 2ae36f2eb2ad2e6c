//! Hybrid semantic + lexical ranking.

use std::sync::Arc;

use tracing::debug;

use replybase_protocols::{ContentItem, RankOutcome, DEFAULT_ID};
use replybase_store::ContentStore;

use crate::embedding::HashEmbedder;
use crate::lexical::{self, LexicalWeights};

/// Thresholds and weights of the selection policy.
///
/// The values are empirically chosen; every one of them is overridable.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Queries shorter than this (normalized) are rejected outright.
    pub min_query_len: usize,
    /// Keyword score above which an item is a candidate without an embedding.
    pub keyword_floor: f32,
    /// Cosine similarity below which an embedding alone does not make an
    /// item selectable.
    pub embedding_floor: f32,
    /// Aggregate score the top candidate must exceed to be selected.
    pub accept_threshold: f32,
    /// Acceptance threshold when no item carries any embedding and the
    /// ranker degrades to pure keyword scoring.
    pub keyword_only_threshold: f32,
    /// Weight of the embedding term in the aggregate.
    pub embedding_weight: f32,
    /// Weight of the keyword term in the aggregate.
    pub keyword_weight: f32,
    /// Content/manual weighting inside the keyword score.
    pub lexical: LexicalWeights,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            min_query_len: 5,
            keyword_floor: 0.3,
            embedding_floor: 0.2,
            accept_threshold: 0.25,
            keyword_only_threshold: 0.3,
            embedding_weight: 0.7,
            keyword_weight: 0.3,
            lexical: LexicalWeights::default(),
        }
    }
}

/// Per-item scoring breakdown, mostly for inspection and tests.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub id: String,
    pub keyword_score: f32,
    /// None when the item carries no embedding or the ranker is degraded.
    pub embedding_score: Option<f32>,
    pub aggregate: f32,
    /// Whether the item may be selected: it is in the candidate set and not
    /// relying solely on a sub-floor embedding similarity.
    pub selectable: bool,
}

/// Single-shot decision procedure: given a query, which item answers it best.
///
/// The default item is excluded from candidacy; it is the read-miss fallback,
/// not a ranked answer.
pub struct HybridRanker {
    store: Arc<ContentStore>,
    embedder: HashEmbedder,
    config: RankerConfig,
}

impl HybridRanker {
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self {
            store,
            embedder: HashEmbedder::default(),
            config: RankerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RankerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_embedder(mut self, embedder: HashEmbedder) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn embedder(&self) -> &HashEmbedder {
        &self.embedder
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Score every non-default item against the query, sorted by aggregate
    /// descending (stable: ties keep enumeration order).
    pub async fn score(&self, query: &str) -> Vec<ScoredCandidate> {
        let items = self.store.list().await;
        self.score_items(query, &items)
    }

    /// Select the best item for the query, or `NoMatch` when nothing clears
    /// the acceptance threshold.
    pub async fn rank(&self, query: &str) -> RankOutcome {
        let normalized = lexical::normalize(query);
        if normalized.chars().count() < self.config.min_query_len {
            debug!("query too short to rank: {normalized:?}");
            return RankOutcome::NoMatch;
        }

        let items = self.store.list().await;
        let degraded = !items
            .iter()
            .any(|i| i.id != DEFAULT_ID && i.embedding.is_some());
        let threshold = if degraded {
            self.config.keyword_only_threshold
        } else {
            self.config.accept_threshold
        };

        let scored = self.score_items(query, &items);
        let top = scored.into_iter().find(|c| c.selectable);

        match top {
            Some(top) if top.aggregate > threshold => {
                let content = items
                    .iter()
                    .find(|i| i.id == top.id)
                    .map(|i| i.content.clone())
                    .unwrap_or_default();
                debug!("selected '{}' with aggregate {:.3}", top.id, top.aggregate);
                RankOutcome::Match {
                    id: top.id,
                    content,
                    score: top.aggregate,
                }
            }
            _ => RankOutcome::NoMatch,
        }
    }

    fn score_items(&self, query: &str, items: &[ContentItem]) -> Vec<ScoredCandidate> {
        // Degrade to pure keyword scoring when the semantic term cannot
        // contribute anywhere.
        let degraded = !items
            .iter()
            .any(|i| i.id != DEFAULT_ID && i.embedding.is_some());
        let query_embedding = if degraded {
            None
        } else {
            Some(self.embedder.embed(query))
        };

        let mut scored = Vec::with_capacity(items.len());
        for item in items {
            if item.id == DEFAULT_ID {
                continue;
            }

            let keyword_score =
                lexical::keyword_match_score(query, &item.content, &item.keywords, &self.config.lexical);

            let entry = if let Some(query_embedding) = &query_embedding {
                let candidate =
                    keyword_score > self.config.keyword_floor || item.embedding.is_some();

                let embedding_score = item
                    .embedding
                    .as_ref()
                    .map(|e| query_embedding.cosine_similarity(e));
                let cosine = embedding_score.unwrap_or(0.0);

                // A sub-floor similarity is still recorded, but it cannot
                // carry an item that has nothing else going for it.
                let selectable = candidate
                    && (keyword_score > self.config.keyword_floor
                        || cosine >= self.config.embedding_floor);

                let aggregate = self.config.embedding_weight * cosine
                    + self.config.keyword_weight * keyword_score;

                ScoredCandidate {
                    id: item.id.clone(),
                    keyword_score,
                    embedding_score,
                    aggregate,
                    selectable,
                }
            } else {
                ScoredCandidate {
                    id: item.id.clone(),
                    keyword_score,
                    embedding_score: None,
                    aggregate: keyword_score,
                    selectable: keyword_score > 0.0,
                }
            };

            scored.push(entry);
        }

        // Stable sort: ties keep the original enumeration order
        scored.sort_by(|a, b| {
            b.aggregate
                .partial_cmp(&a.aggregate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored
    }
}

#[cfg(test)]
#[path = "ranker_tests.rs"]
mod tests;
