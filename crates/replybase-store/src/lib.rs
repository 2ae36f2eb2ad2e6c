//! Content store and recommendation link graph for replybase.
//!
//! The store is the sole owner of all content item state. It keeps a single
//! process-wide cached snapshot over the backing key-value collaborator,
//! hydrated lazily on first read and discarded wholesale on every successful
//! write. The link graph maintains directed recommendation edges between
//! items and repairs them when items are deleted.

mod links;
mod store;

pub use links::{LinkGraph, ResolvedLink};
pub use store::{decode_value, ContentStore};
