//! Deterministic hash-based embedding generation.

use replybase_protocols::Embedding;

use crate::lexical;

/// Default embedding dimension shared by the whole store.
pub const DEFAULT_DIMENSION: usize = 128;

/// Fixed prime used to spread token hashes across dimensions. Must be small
/// relative to the hash range: the per-dimension `+ i*37` offset only varies
/// the residue when it is comparable to the modulus, and a large prime would
/// give every token a near-constant value in all dimensions.
const SPREAD_PRIME: u32 = 997;

/// Per-dimension offset multiplier.
const SPREAD_STEP: u32 = 37;

/// Upper bound on tokens folded into one embedding.
const MAX_TOKENS: usize = 100;

/// Pure, deterministic text-to-vector generator.
///
/// This is a coarse lexical-hash fingerprint, not a trained vector space:
/// identical text always yields a bit-identical vector, collisions are
/// possible and expected, and no semantic ordering is guaranteed beyond soft
/// lexical clustering.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a text into a fixed-dimension vector.
    ///
    /// Tokens shorter than three characters are dropped, duplicates are
    /// folded, and the token count is capped to bound cost. The accumulated
    /// vector is L2-normalized unless no token qualified, in which case the
    /// zero vector is returned unmodified.
    pub fn embed(&self, text: &str) -> Embedding {
        let tokens = lexical::significant_tokens(text);
        let mut acc = vec![0.0f32; self.dimension];

        for token in tokens.iter().take(MAX_TOKENS) {
            let mut hash: u32 = 0;
            for ch in token.chars() {
                hash = hash.wrapping_mul(31).wrapping_add(ch as u32);
            }

            for (i, slot) in acc.iter_mut().enumerate() {
                let spread = hash.wrapping_add((i as u32).wrapping_mul(SPREAD_STEP)) % SPREAD_PRIME;
                let value = f64::from(spread) / f64::from(SPREAD_PRIME) * 2.0 - 1.0;
                *slot += value as f32;
            }
        }

        let norm: f32 = acc.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut acc {
                *v /= norm;
            }
        }

        Embedding::new(acc)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_has_configured_dimension() {
        let embedder = HashEmbedder::new(64);
        assert_eq!(embedder.embed("hello world").dimension(), 64);
    }

    #[test]
    fn test_embedding_is_unit_length() {
        let embedder = HashEmbedder::default();
        let emb = embedder.embed("how do I reset my password");
        assert!((emb.l2_norm() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_no_qualifying_tokens_yields_zero_vector() {
        let embedder = HashEmbedder::default();

        for text in ["", "a b c", "!!! ?? ..", "is to of"] {
            let emb = embedder.embed(text);
            assert_eq!(emb.dimension(), DEFAULT_DIMENSION);
            assert_eq!(emb.l2_norm(), 0.0, "expected zero vector for {text:?}");
        }
    }

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Hello, how can I pay my bill?");
        let b = embedder.embed("Hello, how can I pay my bill?");
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_embedding_ignores_case_and_punctuation() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Billing: questions!");
        let b = embedder.embed("billing questions");
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_duplicate_tokens_fold() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("billing billing billing");
        let b = embedder.embed("billing");
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_identical_text_self_similarity() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("restart the application server");
        let b = embedder.embed("restart the application server");
        assert!((a.cosine_similarity(&b) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_different_texts_are_not_collinear() {
        // Unrelated texts must land on genuinely distinct directions; a
        // cosine near ±1 means the spread degenerated into a constant
        // per-token vector.
        let embedder = HashEmbedder::default();
        let pairs = [
            ("billing and invoices", "kubernetes cluster networking"),
            ("reset password", "weather forecast tomorrow sunny"),
        ];

        for (a, b) in pairs {
            let cosine = embedder.embed(a).cosine_similarity(&embedder.embed(b));
            assert!(
                cosine.abs() < 0.9,
                "embeddings of {a:?} and {b:?} are near-collinear: {cosine}"
            );
        }
    }
}
