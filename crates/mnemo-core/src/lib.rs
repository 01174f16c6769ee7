//! Persistent memory for conversational agents.
//!
//! A store that accepts short text facts, indexes them, and later returns
//! the facts most relevant to a query. Two interchangeable backends sit
//! behind one [`MemoryStore`] trait:
//!
//! - **lexical** — a flat-file ledger ranked with BM25 over a mixed-script
//!   tokenizer (jieba for CJK, whitespace for Latin);
//! - **graph** — an embedded database persisting memories as nodes and
//!   inferring `FOLLOWS` / `RELATED_TO` edges between them on every add.
//!
//! Saved memories survive process restarts: every add is flushed to the
//! backing file or database before its id is acknowledged.
//!
//! # Example
//!
//! ```no_run
//! use mnemo_core::{LexicalMemoryStore, MemoryStore};
//!
//! fn example() -> mnemo_core::Result<()> {
//!     let store = LexicalMemoryStore::open("db_cache/memories");
//!     let id = store.add("the user prefers dark mode", 1)?;
//!     let hits = store.retrieve("user preferences", 5)?;
//!     assert!(store.get_by_id(&id)?.is_some());
//!     # let _ = hits;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod index;
pub mod ledger;
pub mod store;
pub mod tokenize;
pub mod types;

pub use error::{Error, Result};
pub use index::Bm25Index;
pub use ledger::Ledger;
pub use store::{
    DEFAULT_RETRIEVE_LIMIT, GraphMemoryStore, GraphStoreConfig, LexicalMemoryStore, MemoryStore,
    content_similarity,
};
pub use tokenize::tokenize;
pub use types::{FollowsEdge, MemoryRecord, RelatedEdge, ScoredMemory};
