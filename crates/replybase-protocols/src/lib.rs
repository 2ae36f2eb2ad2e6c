//! Protocol definitions for the replybase retrieval engine.
//!
//! Contains the content item data model, the error taxonomy shared by all
//! components, the result contracts consumed by presentation layers, and the
//! `ContentKv` trait for the backing key-value collaborator.

mod error;
mod kv;
mod types;

pub use error::StoreError;
pub use kv::{ContentKv, MemoryKv};
pub use types::{
    ContentItem, Embedding, MutationOutcome, RankOutcome, RegenerateFailure, RegenerateReport,
    StoredRecord, DEFAULT_ID,
};
