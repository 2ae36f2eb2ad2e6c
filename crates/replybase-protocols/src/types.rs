//! Content item data model and result contracts.

use serde::{Deserialize, Serialize};

/// Id of the protected fallback item. It always exists and is never deleted.
pub const DEFAULT_ID: &str = "default";

/// A fixed-dimension vector fingerprint of a piece of text.
///
/// Produced by the deterministic hash-based generator; stored on the wire as
/// a bare float array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn l2_norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity with another embedding.
    ///
    /// Returns 0.0 on dimension mismatch or when either vector is all zero.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        if self.dimension() != other.dimension() {
            return 0.0;
        }

        let dot: f32 = self
            .vector
            .iter()
            .zip(other.vector.iter())
            .map(|(a, b)| a * b)
            .sum();

        let norm_a = self.l2_norm();
        let norm_b = other.l2_norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

/// A uniquely-keyed unit of retrievable answer text plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable, externally assigned id. Immutable once created.
    pub id: String,

    /// Body text returned to the caller when this item is selected.
    pub content: String,

    /// Display name shown by listing/view surfaces.
    pub name: String,

    /// Manually curated keywords. No duplicates; carries more ranking weight
    /// than auto content matches.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Absent until first registered or regenerated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,

    /// Directed recommendation edges to other item ids. Ordered, no
    /// self-loops, no duplicates.
    #[serde(default)]
    pub recommended_ids: Vec<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            content: content.into(),
            keywords: Vec::new(),
            embedding: None,
            recommended_ids: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Build an item from a bare raw-text stored value. The whole value
    /// becomes the content and the name derives from the id.
    pub fn from_raw_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, text)
    }
}

/// The structured on-wire form of a stored value.
///
/// Stored values are decoded in a fixed two-variant order: this record first,
/// and on failure the whole value is treated as raw content text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_ids: Vec<String>,
}

impl StoredRecord {
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            content: item.content.clone(),
            name: Some(item.name.clone()),
            keywords: item.keywords.clone(),
            embedding: item.embedding.clone(),
            recommended_ids: item.recommended_ids.clone(),
        }
    }

    pub fn into_item(self, id: impl Into<String>) -> ContentItem {
        let id = id.into();
        ContentItem {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            content: self.content,
            keywords: self.keywords,
            embedding: self.embedding,
            recommended_ids: self.recommended_ids,
        }
    }
}

/// Result contract for mutation commands, consumed by a presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,

    /// Current state after the mutation (keywords or links), when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Vec<String>>,

    /// Entries removed by the mutation, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<Vec<String>>,
}

impl MutationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            current: None,
            removed: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            current: None,
            removed: None,
        }
    }

    pub fn with_current(mut self, current: Vec<String>) -> Self {
        self.current = Some(current);
        self
    }

    pub fn with_removed(mut self, removed: Vec<String>) -> Self {
        self.removed = Some(removed);
        self
    }
}

/// Outcome of ranking a query against the corpus.
///
/// Callers resolve `NoMatch` to the default item's content.
#[derive(Debug, Clone, PartialEq)]
pub enum RankOutcome {
    Match {
        id: String,
        content: String,
        score: f32,
    },
    NoMatch,
}

impl RankOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, RankOutcome::Match { .. })
    }
}

/// One item that failed during a bulk embedding pass.
#[derive(Debug, Clone)]
pub struct RegenerateFailure {
    pub id: String,
    pub reason: String,
}

/// Aggregate counts reported by the bulk embedding regeneration.
#[derive(Debug, Clone, Default)]
pub struct RegenerateReport {
    pub total: usize,
    pub updated: usize,
    pub failed: Vec<RegenerateFailure>,
}

impl RegenerateReport {
    pub fn record_success(&mut self) {
        self.updated += 1;
    }

    pub fn record_failure(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(RegenerateFailure {
            id: id.into(),
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        assert!(a.cosine_similarity(&b).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let zero = Embedding::new(vec![0.0, 0.0]);
        assert_eq!(a.cosine_similarity(&zero), 0.0);
        assert_eq!(zero.cosine_similarity(&zero), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0]);
        assert_eq!(a.cosine_similarity(&b), 0.0);
    }

    #[test]
    fn test_embedding_serializes_as_bare_array() {
        let emb = Embedding::new(vec![0.5, -0.5]);
        let json = serde_json::to_string(&emb).unwrap();
        assert_eq!(json, "[0.5,-0.5]");
    }

    #[test]
    fn test_stored_record_round_trip() {
        let item = ContentItem::new("faq", "Billing answers")
            .with_name("FAQ")
            .with_keywords(vec!["billing".to_string()])
            .with_embedding(Embedding::new(vec![1.0, 0.0]));

        let record = StoredRecord::from_item(&item);
        let json = serde_json::to_string(&record).unwrap();
        let decoded: StoredRecord = serde_json::from_str(&json).unwrap();
        let restored = decoded.into_item("faq");

        assert_eq!(restored, item);
    }

    #[test]
    fn test_stored_record_minimal_fields() {
        let json = r#"{"content":"just text"}"#;
        let record: StoredRecord = serde_json::from_str(json).unwrap();
        let item = record.into_item("greeting");

        assert_eq!(item.content, "just text");
        assert_eq!(item.name, "greeting");
        assert!(item.keywords.is_empty());
        assert!(item.embedding.is_none());
        assert!(item.recommended_ids.is_empty());
    }

    #[test]
    fn test_raw_text_item_derives_name_from_id() {
        let item = ContentItem::from_raw_text("setup", "Install the app first.");
        assert_eq!(item.name, "setup");
        assert_eq!(item.content, "Install the app first.");
        assert!(item.embedding.is_none());
    }

    #[test]
    fn test_mutation_outcome_builders() {
        let outcome = MutationOutcome::ok("added")
            .with_current(vec!["billing".to_string()])
            .with_removed(vec!["old".to_string()]);

        assert!(outcome.success);
        assert_eq!(outcome.current.unwrap(), vec!["billing".to_string()]);
        assert_eq!(outcome.removed.unwrap(), vec!["old".to_string()]);

        let failure = MutationOutcome::failure("nope");
        assert!(!failure.success);
        assert!(failure.current.is_none());
    }

    #[test]
    fn test_rank_outcome_is_match() {
        let outcome = RankOutcome::Match {
            id: "faq".to_string(),
            content: "text".to_string(),
            score: 0.5,
        };
        assert!(outcome.is_match());
        assert!(!RankOutcome::NoMatch.is_match());
    }

    #[test]
    fn test_regenerate_report_counters() {
        let mut report = RegenerateReport {
            total: 3,
            ..Default::default()
        };
        report.record_success();
        report.record_success();
        report.record_failure("bad", "kv write refused");

        assert_eq!(report.updated, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, "bad");
    }
}
