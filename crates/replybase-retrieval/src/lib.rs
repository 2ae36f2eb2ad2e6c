//! Hybrid retrieval over the replybase content store.
//!
//! Combines a deterministic hash-based embedding generator with lexical
//! keyword scoring to pick the best pre-authored answer for a free-text
//! query.
//!
//! ## How it works
//!
//! 1. Every item gets a keyword match score against the query
//! 2. Items over the keyword floor, or carrying an embedding, become
//!    candidates
//! 3. Candidates get a cosine similarity score against the query embedding
//! 4. Scores are combined linearly (semantic term weighted higher) and the
//!    top candidate wins if it clears the acceptance threshold

mod embedding;
mod engine;
pub mod lexical;
mod ranker;

pub use embedding::{HashEmbedder, DEFAULT_DIMENSION};
pub use engine::AnswerEngine;
pub use lexical::{jaccard_similarity, keyword_match_score, LexicalWeights};
pub use ranker::{HybridRanker, RankerConfig, ScoredCandidate};
